//! Identity record and the facts derived from it.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use agora_core::UserId;

use crate::Role;

/// Minimum age to register at all.
pub const MINIMUM_AGE: i32 = 13;

/// Age at which `is_adult` flips.
pub const ADULT_AGE: i32 = 18;

/// Durable identity record, owned by the credential store.
///
/// The subsystem never mutates fields in place; role and profile changes go
/// through explicit whole-field replacement operations on the store. The date
/// of birth is required by construction, so "age is undefined" is
/// unrepresentable here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Recompute age and the adult flag as of `today`. Never persisted.
    pub fn derived_facts(&self, today: NaiveDate) -> DerivedAuthFacts {
        let age = age_on(self.date_of_birth, today);
        DerivedAuthFacts {
            age,
            is_adult: age >= ADULT_AGE,
        }
    }
}

/// Computed authorization facts; `is_adult == (age >= 18)` always.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAuthFacts {
    pub age: i32,
    pub is_adult: bool,
}

/// Registration input (plaintext password; hashed before it reaches a store).
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: NaiveDate,
}

/// Whole years between `dob` and `today`, counting a birthday not yet reached
/// this year as one less.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}
