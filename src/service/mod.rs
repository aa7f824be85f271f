pub mod proxy_service;
