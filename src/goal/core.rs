//! Defines the goal model and the database queries for storing goals.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, GoalId, UserID, money::get_decimal};

// ============================================================================
// MODELS
// ============================================================================

/// A savings target that a user puts money towards.
///
/// The current amount is only ever changed by recording a transaction against
/// the goal, see [crate::transaction::create_transaction].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user that owns the goal.
    pub user_id: UserID,
    /// What the user is saving for.
    pub title: String,
    /// How much the user wants to save. Always greater than zero.
    pub target_amount: Decimal,
    /// How much has been saved so far. Never negative.
    pub current_amount: Decimal,
    /// When the user wants to have reached the target.
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    /// When the goal was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to create a new goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    /// What the user is saving for.
    pub title: String,
    /// How much the user wants to save.
    pub target_amount: Decimal,
    /// When the user wants to have reached the target.
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
}

/// Changes to the editable fields of a goal.
///
/// Fields that are `None` are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalUpdate {
    /// The new title.
    #[serde(default)]
    pub title: Option<String>,
    /// The new target amount.
    #[serde(default)]
    pub target_amount: Option<Decimal>,
    /// The new deadline.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
}

impl GoalUpdate {
    /// Apply the changes to `goal`.
    ///
    /// # Errors
    /// Returns [Error::EmptyTitle] if the new title is blank, or
    /// [Error::InvalidAmount] if the new target amount is not positive.
    pub fn apply(self, mut goal: Goal) -> Result<Goal, Error> {
        if let Some(title) = self.title {
            goal.title = validate_title(&title)?;
        }

        if let Some(target_amount) = self.target_amount {
            goal.target_amount = validate_target_amount(target_amount)?;
        }

        if let Some(deadline) = self.deadline {
            goal.deadline = deadline;
        }

        Ok(goal)
    }
}

fn validate_title(title: &str) -> Result<String, Error> {
    let title = title.trim();

    if title.is_empty() {
        Err(Error::EmptyTitle)
    } else {
        Ok(title.to_owned())
    }
}

fn validate_target_amount(target_amount: Decimal) -> Result<Decimal, Error> {
    if target_amount <= Decimal::ZERO {
        Err(Error::InvalidAmount)
    } else {
        Ok(target_amount)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the goal table.
///
/// Deleting a user deletes their goals.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            target_amount TEXT NOT NULL,
            current_amount TEXT NOT NULL DEFAULT '0',
            deadline TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_user_created
         ON goal(user_id, created_at)",
        (),
    )?;

    Ok(())
}

/// Create a new goal for `user_id` with a balance of zero.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyTitle] if the title is blank,
/// - [Error::InvalidAmount] if the target amount is not positive,
/// - or [Error::StorageFailure] if there is some other SQL error.
pub fn create_goal(
    user_id: UserID,
    new_goal: NewGoal,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Goal, Error> {
    let title = validate_title(&new_goal.title)?;
    let target_amount = validate_target_amount(new_goal.target_amount)?;

    let goal = connection
        .prepare(
            "INSERT INTO goal (user_id, title, target_amount, current_amount, deadline, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, title, target_amount, current_amount, deadline, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                title,
                target_amount.to_string(),
                Decimal::ZERO.to_string(),
                new_goal.deadline,
                created_at,
            ),
            map_goal_row,
        )?;

    Ok(goal)
}

/// Retrieve the goal with `goal_id`, regardless of who owns it.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such goal, or
/// [Error::StorageFailure] if there is some other SQL error.
pub fn get_goal(goal_id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    let goal = connection
        .prepare(
            "SELECT id, user_id, title, target_amount, current_amount, deadline, created_at
             FROM goal WHERE id = :id",
        )?
        .query_row(&[(":id", &goal_id)], map_goal_row)?;

    Ok(goal)
}

/// Retrieve the goal with `goal_id` on behalf of `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such goal, or
/// [Error::AccessDenied] if the goal belongs to another user.
pub fn get_owned_goal(
    user_id: UserID,
    goal_id: GoalId,
    connection: &Connection,
) -> Result<Goal, Error> {
    let goal = get_goal(goal_id, connection)?;

    if goal.user_id != user_id {
        tracing::warn!("User {user_id} tried to access goal {goal_id} owned by another user");
        return Err(Error::AccessDenied);
    }

    Ok(goal)
}

/// Retrieve the goals owned by `user_id`, newest first.
///
/// # Errors
/// Returns [Error::StorageFailure] if there is an SQL error.
pub fn list_goals_by_user(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, target_amount, current_amount, deadline, created_at
             FROM goal WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(Error::from))
        .collect()
}

/// Overwrite the stored balance of the goal with `goal_id`.
///
/// This does no validation. Callers must go through
/// [crate::transaction::record_transaction] so that the balance always
/// matches the transaction ledger.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such goal, or
/// [Error::StorageFailure] if there is some other SQL error.
pub fn update_goal_balance(
    goal_id: GoalId,
    current_amount: Decimal,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal SET current_amount = ?1 WHERE id = ?2",
        (current_amount.to_string(), goal_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Change the title, target amount or deadline of a goal owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no such goal,
/// - [Error::AccessDenied] if the goal belongs to another user,
/// - [Error::EmptyTitle] or [Error::InvalidAmount] if the update is invalid,
/// - or [Error::StorageFailure] if there is some other SQL error.
pub fn update_goal(
    user_id: UserID,
    goal_id: GoalId,
    update: GoalUpdate,
    connection: &Connection,
) -> Result<Goal, Error> {
    let goal = get_owned_goal(user_id, goal_id, connection)?;
    let goal = update.apply(goal)?;

    connection.execute(
        "UPDATE goal SET title = ?1, target_amount = ?2, deadline = ?3 WHERE id = ?4",
        (
            &goal.title,
            goal.target_amount.to_string(),
            goal.deadline,
            goal.id,
        ),
    )?;

    Ok(goal)
}

/// Delete a goal owned by `user_id` along with its transactions.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such goal,
/// [Error::AccessDenied] if the goal belongs to another user, or
/// [Error::StorageFailure] if there is some other SQL error.
pub fn delete_goal(user_id: UserID, goal_id: GoalId, connection: &Connection) -> Result<(), Error> {
    get_owned_goal(user_id, goal_id, connection)?;

    connection.execute("DELETE FROM goal WHERE id = ?1", [goal_id])?;

    Ok(())
}

/// Map a database row to a [Goal].
///
/// Expects the columns in the order: id, user_id, title, target_amount,
/// current_amount, deadline, created_at.
pub fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        target_amount: get_decimal(row, 3)?,
        current_amount: get_decimal(row, 4)?,
        deadline: row.get(5)?,
        created_at: row.get(6)?,
    })
}



#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use crate::{
        Error, User,
        goal::{GoalUpdate, NewGoal},
        test_utils::{create_test_db_user, get_test_connection},
    };

    use super::{
        create_goal, delete_goal, get_goal, get_owned_goal, list_goals_by_user, update_goal,
        update_goal_balance,
    };

    fn new_goal(title: &str) -> NewGoal {
        NewGoal {
            title: title.to_owned(),
            target_amount: dec!(100),
            deadline: datetime!(2025-12-31 00:00 UTC),
        }
    }

    fn setup() -> (Connection, User) {
        let connection = get_test_connection();
        let user = create_test_db_user("ada@example.com", &connection);

        (connection, user)
    }

    #[test]
    fn create_goal_starts_at_zero() {
        let (connection, user) = setup();
        let created_at = datetime!(2025-01-01 09:00 UTC);

        let goal = create_goal(user.id, new_goal("Bike"), created_at, &connection).unwrap();

        assert_eq!(goal.user_id, user.id);
        assert_eq!(goal.title, "Bike");
        assert_eq!(goal.target_amount, dec!(100));
        assert_eq!(goal.current_amount, dec!(0));
        assert_eq!(goal.deadline, datetime!(2025-12-31 00:00 UTC));
        assert_eq!(goal.created_at, created_at);
        assert_eq!(get_goal(goal.id, &connection), Ok(goal));
    }

    #[test]
    fn create_goal_rejects_non_positive_target() {
        let (connection, user) = setup();
        let mut goal = new_goal("Bike");
        goal.target_amount = dec!(-5);

        let result = create_goal(user.id, goal, datetime!(2025-01-01 09:00 UTC), &connection);

        assert_eq!(result, Err(Error::InvalidAmount));
    }

    #[test]
    fn create_goal_rejects_empty_title() {
        let (connection, user) = setup();

        let result = create_goal(
            user.id,
            new_goal(""),
            datetime!(2025-01-01 09:00 UTC),
            &connection,
        );

        assert_eq!(result, Err(Error::EmptyTitle));
    }

    #[test]
    fn get_goal_fails_on_missing_id() {
        let (connection, _) = setup();

        assert_eq!(get_goal(42, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_owned_goal_denies_other_users() {
        let (connection, owner) = setup();
        let other = create_test_db_user("bob@example.com", &connection);
        let goal = create_goal(
            owner.id,
            new_goal("Bike"),
            datetime!(2025-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_owned_goal(other.id, goal.id, &connection),
            Err(Error::AccessDenied)
        );
        assert_eq!(get_owned_goal(owner.id, goal.id, &connection), Ok(goal));
    }

    #[test]
    fn list_goals_is_newest_first_and_per_user() {
        let (connection, user) = setup();
        let other = create_test_db_user("bob@example.com", &connection);
        let older = create_goal(
            user.id,
            new_goal("Older"),
            datetime!(2025-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        let newer = create_goal(
            user.id,
            new_goal("Newer"),
            datetime!(2025-02-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        create_goal(
            other.id,
            new_goal("Not mine"),
            datetime!(2025-03-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        let goals = list_goals_by_user(user.id, &connection).unwrap();

        assert_eq!(goals, vec![newer, older]);
    }

    #[test]
    fn update_goal_balance_overwrites_amount() {
        let (connection, user) = setup();
        let goal = create_goal(
            user.id,
            new_goal("Bike"),
            datetime!(2025-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        update_goal_balance(goal.id, dec!(12.34), &connection).unwrap();

        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(12.34)
        );
    }

    #[test]
    fn update_goal_balance_fails_on_missing_goal() {
        let (connection, _) = setup();

        assert_eq!(
            update_goal_balance(42, dec!(1), &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_goal_persists_changes() {
        let (connection, user) = setup();
        let goal = create_goal(
            user.id,
            new_goal("Bike"),
            datetime!(2025-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        let update = GoalUpdate {
            title: Some("Road bike".to_owned()),
            deadline: Some(datetime!(2026-06-30 00:00 UTC)),
            ..Default::default()
        };

        let updated = update_goal(user.id, goal.id, update, &connection).unwrap();

        assert_eq!(updated.title, "Road bike");
        assert_eq!(updated.target_amount, dec!(100));
        assert_eq!(updated.deadline, datetime!(2026-06-30 00:00 UTC));
        assert_eq!(get_goal(goal.id, &connection), Ok(updated));
    }

    #[test]
    fn update_goal_denies_other_users() {
        let (connection, owner) = setup();
        let other = create_test_db_user("bob@example.com", &connection);
        let goal = create_goal(
            owner.id,
            new_goal("Bike"),
            datetime!(2025-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        let update = GoalUpdate {
            title: Some("Mine now".to_owned()),
            ..Default::default()
        };

        let result = update_goal(other.id, goal.id, update, &connection);

        assert_eq!(result, Err(Error::AccessDenied));
        assert_eq!(get_goal(goal.id, &connection), Ok(goal));
    }

    #[test]
    fn delete_goal_removes_goal() {
        let (connection, user) = setup();
        let goal = create_goal(
            user.id,
            new_goal("Bike"),
            datetime!(2025-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        delete_goal(user.id, goal.id, &connection).unwrap();

        assert_eq!(get_goal(goal.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_goal_denies_other_users() {
        let (connection, owner) = setup();
        let other = create_test_db_user("bob@example.com", &connection);
        let goal = create_goal(
            owner.id,
            new_goal("Bike"),
            datetime!(2025-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_goal(other.id, goal.id, &connection),
            Err(Error::AccessDenied)
        );
        assert!(get_goal(goal.id, &connection).is_ok());
    }
}
