pub mod git_repository;
