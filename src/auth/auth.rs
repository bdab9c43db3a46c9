use crate::auth::jwt;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

/// The authenticated principal attached to every call. Role gates what a
/// principal may decide; `employee_id` is the identity the workflow
/// checks ownership against.
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    pub department_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match jwt::verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
            department_id: claims.department_id,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The employee identity of the caller, required for self-service
    /// operations (filing requests, clocking in, recalls).
    pub fn employee_id(&self) -> actix_web::Result<u64> {
        self.employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{Claims, sign_token};
    use actix_web::test::TestRequest;

    fn test_config() -> Config {
        Config {
            database_url: "mysql://unused".into(),
            server_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            api_prefix: "/api/v1".into(),
            rate_protected_per_min: 1000,
            late_threshold_minutes: 10,
            allow_negative_balance: false,
            absence_sweep_interval_secs: 900,
        }
    }

    fn request_with(token: &str) -> HttpRequest {
        TestRequest::default()
            .app_data(Data::new(test_config()))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_http_request()
    }

    #[actix_web::test]
    async fn extracts_role_and_employee_identity() {
        let token = sign_token(
            &Claims {
                user_id: 7,
                sub: "jdoe".into(),
                role: 2,
                exp: 4_102_444_800,
                employee_id: Some(1000),
                department_id: Some(4),
            },
            "test-secret",
        );
        let req = request_with(&token);
        let user = AuthUser::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Employee);
        assert_eq!(user.employee_id().unwrap(), 1000);
        assert!(user.require_admin().is_err());
    }

    #[actix_web::test]
    async fn rejects_missing_and_malformed_tokens() {
        let req = TestRequest::default()
            .app_data(Data::new(test_config()))
            .to_http_request();
        assert!(
            AuthUser::from_request(&req, &mut Payload::None)
                .await
                .is_err()
        );

        let req = request_with("not-a-jwt");
        assert!(
            AuthUser::from_request(&req, &mut Payload::None)
                .await
                .is_err()
        );
    }

    #[actix_web::test]
    async fn rejects_unknown_role_ids() {
        let token = sign_token(
            &Claims {
                user_id: 7,
                sub: "jdoe".into(),
                role: 9,
                exp: 4_102_444_800,
                employee_id: None,
                department_id: None,
            },
            "test-secret",
        );
        let req = request_with(&token);
        assert!(
            AuthUser::from_request(&req, &mut Payload::None)
                .await
                .is_err()
        );
    }
}
