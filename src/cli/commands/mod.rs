pub mod logging;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DEV: &str = "dev";
pub const CMD_HASH_PASSWORD: &str = "hash-password";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("webgate")
        .about("Login and private area behind a reverse proxy")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on, bound to 127.0.0.1 only")
                .default_value("5000")
                .env("PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DEV)
                .long("dev")
                .help("Development mode: show error details on 500 pages")
                .env("WEBGATE_DEV")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new(CMD_HASH_PASSWORD)
                .about("Read a password on stdin and print its Argon2id hash for a users file"),
        );

    let command = session::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "webgate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Login and private area behind a reverse proxy".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("PORT", None::<&str>),
                ("WEBGATE_DEV", None),
                ("WEBGATE_LOG_DIR", None),
                ("WEBGATE_LOG_LEVEL", None),
            ],
            || {
                let matches = new().get_matches_from(vec!["webgate"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(5000));
                assert!(!matches.get_flag(ARG_DEV));
                assert_eq!(
                    matches.get_one::<PathBuf>(logging::ARG_LOG_DIR).cloned(),
                    Some(PathBuf::from("/var/log/webapp"))
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(0)
                );
                assert!(matches.subcommand().is_none());
            },
        );
    }

    #[test]
    fn test_check_port_and_dev() {
        temp_env::with_vars([("PORT", None::<&str>), ("WEBGATE_DEV", None)], || {
            let matches = new().get_matches_from(vec!["webgate", "--port", "8080", "--dev"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert!(matches.get_flag(ARG_DEV));
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PORT", Some("443")),
                ("WEBGATE_DEV", Some("1")),
                ("WEBGATE_LOG_DIR", Some("/tmp/webgate")),
                ("WEBGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["webgate"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert!(matches.get_flag(ARG_DEV));
                assert_eq!(
                    matches.get_one::<PathBuf>(logging::ARG_LOG_DIR).cloned(),
                    Some(PathBuf::from("/tmp/webgate"))
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("WEBGATE_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["webgate"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("WEBGATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["webgate".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_hash_password_subcommand() {
        let matches = new().get_matches_from(vec!["webgate", CMD_HASH_PASSWORD]);
        assert_eq!(matches.subcommand_name(), Some(CMD_HASH_PASSWORD));
    }
}
