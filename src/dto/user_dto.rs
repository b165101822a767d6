use serde::Deserialize;
use validator::Validate;

use crate::models::user::{UserChanges, UserRole};
use crate::utils::errors::{into_result, AppResult};
use crate::utils::validation::{derive_errors, non_blank, parse_field};

// Admin update of an account
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    pub role: Option<String>,

    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> AppResult<UserChanges> {
        let mut errors = derive_errors(&self);
        let role = parse_field::<UserRole>(&mut errors, "role", self.role.as_deref(), "Role must be admin or staff");
        into_result(errors)?;

        Ok(UserChanges {
            name: non_blank(self.name),
            role,
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_request() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"isActive": false, "role": "admin"}"#).unwrap();
        let changes = req.into_changes().unwrap();
        assert_eq!(changes.is_active, Some(false));
        assert_eq!(changes.role, Some(UserRole::Admin));
        assert_eq!(changes.name, None);

        let req: UpdateUserRequest = serde_json::from_str(r#"{"role": "root"}"#).unwrap();
        assert!(req.into_changes().is_err());
    }
}
