pub mod session_memory_repository;
