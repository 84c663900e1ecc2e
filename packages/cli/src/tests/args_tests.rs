use crate::args::{Cli, Commands};
use clap::Parser;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::{path::PathBuf, time::Duration};
use strava_auth::AuthSettings;

fn scopes_of(command: &Commands) -> Vec<String> {
    match command {
        Commands::Login { scopes, .. } | Commands::Status { scopes } | Commands::Clear { scopes } => {
            scopes.scopes.clone()
        }
    }
}

#[test]
fn test_defaults_match_original_flags() {
    let cli = Cli::try_parse_from(["strava-auth", "login"]).unwrap();

    assert_eq!(cli.auth.client_id, "");
    assert_eq!(cli.auth.client_id_file, PathBuf::from("clientid.dat"));
    assert_eq!(cli.auth.client_secret_file, PathBuf::from("clientsecret.dat"));
    assert!(cli.auth.cache_token);
    assert_eq!(cli.auth.auth_url, "https://www.strava.com/oauth/authorize");
    assert_eq!(cli.auth.token_url, "https://www.strava.com/oauth/token");
    assert_eq!(scopes_of(&cli.command), vec!["read", "activity:read"]);
}

#[rstest]
#[case(&["--scope", "read"], &["read"])]
#[case(&["--scope", "read,activity:read_all"], &["read", "activity:read_all"])]
#[case(&["--scope", "activity:write", "--scope", "read"], &["activity:write", "read"])]
fn test_scopes_keep_given_order(#[case] flags: &[&str], #[case] expected: &[&str]) {
    let mut argv = vec!["strava-auth", "status"];
    argv.extend_from_slice(flags);
    let cli = Cli::try_parse_from(argv).unwrap();

    assert_eq!(scopes_of(&cli.command), expected);
}

#[test]
fn test_flags_become_finalized_settings() {
    let cli = Cli::try_parse_from([
        "strava-auth",
        "--strava-clientid",
        "123",
        "--strava-secret",
        "shh",
        "--strava-cachetoken",
        "false",
        "--cache-dir",
        "/tmp/strava-auth-test",
        "--callback-timeout-secs",
        "90",
        "login",
        "--print-token",
    ])
    .unwrap();

    assert!(matches!(cli.command, Commands::Login { print_token: true, .. }));

    let settings = AuthSettings::from(cli.auth);
    assert!(settings.is_finalized());
    assert_eq!(settings.client_id, "123");
    assert_eq!(settings.client_secret, "shh");
    assert!(!settings.cache_token);
    assert_eq!(settings.cache_dir, Some(PathBuf::from("/tmp/strava-auth-test")));
    assert_eq!(settings.callback_timeout, Some(Duration::from_secs(90)));
}

#[test]
fn test_subcommand_is_required() {
    assert!(Cli::try_parse_from(["strava-auth"]).is_err());
}

#[test]
fn test_cachetoken_requires_a_bool() {
    assert!(Cli::try_parse_from(["strava-auth", "--strava-cachetoken", "maybe", "login"]).is_err());
}
