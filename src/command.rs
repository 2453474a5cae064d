//! Driver Commands
//!
//! Parses the line-oriented commands the `mini_lru` binary reads from stdin.

use std::str::FromStr;

use crate::error::Error;

/// One line of driver input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `set <key> <value...>` - the value is the rest of the line
    Set { key: String, value: String },
    /// `get <key>` - exactly one key, no trailing words
    Get { key: String },
    /// `clear`
    Clear,
    /// `keys` - list keys, most recent first
    Keys,
    /// `stats` - print counters as JSON
    Stats,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(Error::EmptyCommand),
            "set" => {
                let (key, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(key, value)| (key, value.trim_start()))
                    .ok_or(Error::MissingArgument {
                        command: "set",
                        argument: "value",
                    })?;
                Ok(Command::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            "get" => {
                let mut words = rest.split_whitespace();
                let key = words.next().ok_or(Error::MissingArgument {
                    command: "get",
                    argument: "key",
                })?;
                if let Some(extra) = words.next() {
                    return Err(Error::UnexpectedArgument {
                        command: "get",
                        argument: extra.to_string(),
                    });
                }
                Ok(Command::Get {
                    key: key.to_string(),
                })
            }
            "clear" => Ok(Command::Clear),
            "keys" => Ok(Command::Keys),
            "stats" => Ok(Command::Stats),
            _ => Err(Error::UnknownCommand(word.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_keeps_spaces_in_value() {
        let cmd: Command = "set greeting hello  world".parse().unwrap();
        assert_eq!(
            cmd,
            Command::Set {
                key: "greeting".to_string(),
                value: "hello  world".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_get() {
        let cmd: Command = "  GET a ".parse().unwrap();
        assert_eq!(cmd, Command::Get { key: "a".to_string() });
    }

    #[test]
    fn test_get_key_matches_set_key() {
        let set: Command = "set user:1 Ada Lovelace".parse().unwrap();
        let get: Command = "get  user:1".parse().unwrap();

        let Command::Set { key: set_key, .. } = &set else {
            panic!("expected set, got {:?}", set);
        };
        assert_eq!(get, Command::Get { key: set_key.clone() });
    }

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!("clear".parse::<Command>(), Ok(Command::Clear));
        assert_eq!("keys".parse::<Command>(), Ok(Command::Keys));
        assert_eq!("stats".parse::<Command>(), Ok(Command::Stats));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("   ".parse::<Command>(), Err(Error::EmptyCommand));
        assert_eq!(
            "set onlykey".parse::<Command>(),
            Err(Error::MissingArgument {
                command: "set",
                argument: "value",
            })
        );
        assert_eq!(
            "get".parse::<Command>(),
            Err(Error::MissingArgument {
                command: "get",
                argument: "key",
            })
        );
        assert_eq!(
            "get a b".parse::<Command>(),
            Err(Error::UnexpectedArgument {
                command: "get",
                argument: "b".to_string(),
            })
        );
        assert_eq!(
            "del a".parse::<Command>(),
            Err(Error::UnknownCommand("del".to_string()))
        );
    }
}
