// ABOUTME: Shared configuration names for strava-auth
// ABOUTME: Environment variable names and default values used by the auth library and CLI

pub mod constants;
pub mod defaults;
