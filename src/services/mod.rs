pub mod sync_service;
