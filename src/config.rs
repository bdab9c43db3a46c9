use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub jwt_secret: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Attendance / ledger policy
    pub late_threshold_minutes: i64,
    pub allow_negative_balance: bool,
    pub absence_sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            late_threshold_minutes: env::var("LATE_THRESHOLD_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap(),
            allow_negative_balance: env::var("ALLOW_NEGATIVE_BALANCE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap(),
            absence_sweep_interval_secs: env::var("ABSENCE_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .unwrap(),
        }
    }
}
