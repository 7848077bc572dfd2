#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub processor_default_url: String,
    pub processor_fallback_url: String,
    pub backend_id: String,
    pub own_db_path: String,
    pub peer_db_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let backend_id = std::env::var("BACKEND_ID").unwrap_or_else(|_| "1".to_string());
        let (own_default, peer_default) = if backend_id == "2" {
            ("temp/app2.db", "temp/app1.db")
        } else {
            ("temp/app1.db", "temp/app2.db")
        };

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9999".to_string()),
            processor_default_url: std::env::var("PAYMENT_PROCESSOR_URL_DEFAULT")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            processor_fallback_url: std::env::var("PAYMENT_PROCESSOR_URL_FALLBACK")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            backend_id,
            own_db_path: std::env::var("SQLITE_DATABASE").unwrap_or_else(|_| own_default.to_string()),
            peer_db_path: std::env::var("SQLITE_DATABASE_PEER")
                .unwrap_or_else(|_| peer_default.to_string()),
        }
    }
}
