pub mod alerts;
pub mod circuit {
    pub mod monitor;
    pub mod state;
    pub mod transitions;
}
pub mod config;
pub mod domain {
    pub mod alert;
    pub mod endpoint;
    pub mod request;
    pub mod selection_log;
}
pub mod error;
pub mod events;
pub mod http {
    pub mod handlers {
        pub mod alerts;
        pub mod circuit_breaker;
        pub mod endpoints;
        pub mod ops;
        pub mod payins;
        pub mod stats;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
}
pub mod registry;
pub mod scoring {
    pub mod engine;
    pub mod types;
}
pub mod service {
    pub mod engine;
    pub mod ticker;
}
pub mod stats {
    pub mod aggregator;
    pub mod log_store;
    pub mod window;
}

#[derive(Clone)]
pub struct AppState {
    pub engine: service::engine::RoutingEngine,
}
