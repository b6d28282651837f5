//! Input validation utilities

use crate::models::{NewActivity, NewUser};

/// Validate a registration payload. Only presence is checked; any non-blank
/// username, email and password is accepted.
pub fn validate_new_user(new_user: &NewUser) -> Result<(), String> {
    if new_user.username.trim().is_empty()
        || new_user.email.trim().is_empty()
        || new_user.password.is_empty()
    {
        return Err("Username, email and password are required".to_string());
    }

    Ok(())
}

/// Validate a point-earning event
pub fn validate_activity(activity: &NewActivity) -> Result<(), String> {
    if activity.activity_type.trim().is_empty() {
        return Err("Activity type is required".to_string());
    }

    if activity.activity_type.len() > 64 {
        return Err("Activity type must be at most 64 characters long".to_string());
    }

    if activity.points_earned < 0 {
        return Err("Points earned must not be negative".to_string());
    }

    Ok(())
}
