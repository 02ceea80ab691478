//! Tag source implementations for fetching published tags

pub mod docker_hub;

pub use docker_hub::DockerHubTags;
