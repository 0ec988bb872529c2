use std::io::Write;

#[cfg(not(feature = "log"))]
use crate::{debug, info};
#[cfg(feature = "log")]
use log::{debug, info};

use crate::alias::AliasStore;
use crate::cmd::RuntimeError;
use crate::waker::{PacketSender, WakeResolver};

/// What the first positional token names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Alias,
    List,
    Remove,
    Wake,
    /// Not a known command: the token itself is the wake target.
    Implicit,
}

impl CommandKind {
    pub fn from_token(token: &str) -> CommandKind {
        match token.to_lowercase().as_str() {
            "alias" => CommandKind::Alias,
            "list" => CommandKind::List,
            "remove" => CommandKind::Remove,
            "wake" => CommandKind::Wake,
            _ => CommandKind::Implicit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Alias {
        name: String,
        mac: String,
        iface: Option<String>,
    },
    List,
    Remove {
        name: String,
    },
    Wake {
        target: String,
    },
}

impl Operation {
    pub fn parse(args: &[String]) -> Result<Operation, RuntimeError> {
        let (token, rest) = args
            .split_first()
            .ok_or_else(|| RuntimeError::Validation("no command specified".to_owned()))?;

        match CommandKind::from_token(token) {
            CommandKind::Alias => match rest {
                [name, mac, extra @ ..] if !name.is_empty() && !mac.is_empty() => Ok(Operation::Alias {
                    name: name.clone(),
                    mac: mac.clone(),
                    iface: extra.first().filter(|i| !i.is_empty()).cloned(),
                }),
                _ => Err(RuntimeError::Validation("alias command requires a <name> and a <mac>".to_owned())),
            },
            CommandKind::List => Ok(Operation::List),
            CommandKind::Remove => match rest.first() {
                Some(name) if !name.is_empty() => Ok(Operation::Remove { name: name.clone() }),
                _ => Err(RuntimeError::Validation("remove command requires a <name> of an alias".to_owned())),
            },
            CommandKind::Wake => Self::wake(rest),
            CommandKind::Implicit => {
                info!("`{}` is not a command, treating it as a wake target", token);
                Self::wake(args)
            }
        }
    }

    fn wake(args: &[String]) -> Result<Operation, RuntimeError> {
        match args.first() {
            Some(target) if !target.is_empty() => {
                if args.len() > 1 {
                    debug!("ignoring extra wake arguments: {:?}", &args[1..]);
                }
                Ok(Operation::Wake { target: target.clone() })
            }
            _ => Err(RuntimeError::Validation("no mac address specified to wake command".to_owned())),
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Operation::Alias { .. } => CommandKind::Alias,
            Operation::List => CommandKind::List,
            Operation::Remove { .. } => CommandKind::Remove,
            Operation::Wake { .. } => CommandKind::Wake,
        }
    }

    /// Runs against an open store; user facing output goes to `out`.
    pub fn run<S, W>(
        &self,
        store: &mut AliasStore,
        resolver: &WakeResolver,
        sender: &S,
        out: &mut W,
    ) -> Result<(), RuntimeError>
    where
        S: PacketSender + ?Sized,
        W: Write,
    {
        match self {
            Operation::Alias { name, mac, iface } => {
                store.add(name, mac, iface.as_deref())?;
            }
            Operation::List => {
                let aliases = store.list()?;
                if aliases.is_empty() {
                    writeln!(out, "No aliases found! Add one with \"wol alias <name> <mac>\"")?;
                } else {
                    for (name, alias) in &aliases {
                        writeln!(
                            out,
                            "    {} - {} {}",
                            name,
                            alias.mac,
                            alias.iface.as_deref().unwrap_or("")
                        )?;
                    }
                }
            }
            Operation::Remove { name } => {
                store.del(name)?;
            }
            Operation::Wake { target } => {
                let resolved = resolver.resolve(target, store)?;
                info!(
                    "sending magic packet to {} via {} (interface: {})",
                    resolved.mac,
                    resolved.destination,
                    resolved.iface.as_deref().unwrap_or("default")
                );
                sender.send(&resolved.mac, &resolved.destination, resolved.iface.as_deref())?;
                writeln!(out, "Magic packet sent successfully to {}", resolved.mac)?;
            }
        }
        Ok(())
    }
}
