mod operation;
mod runtime_error;

use std::path::{Path, PathBuf};

pub use operation::{CommandKind, Operation};
pub use runtime_error::RuntimeError;

use crate::alias::AliasStore;
use crate::config::Config;
#[cfg(feature = "log")]
use crate::logger::ConsoleLogger;
#[allow(unused_imports)]
#[cfg(not(feature = "log"))]
use crate::{debug, info, warn};
#[allow(unused_imports)]
#[cfg(feature = "log")]
use log::{debug, info, warn};
use crate::waker::{PacketSender, UdpSender, WakeResolver};
use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "wol",
    about = "wake machines in your LAN with magic packets, by mac address or alias",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Commands:\n  \
        alias <name> <mac> [iface]  store (or overwrite) an alias\n  \
        list                        list stored aliases\n  \
        remove <name>               remove an alias\n  \
        wake <name|mac>             send a magic packet\n\n\
        Any other first argument is treated as `wake <argument>`."
)]
pub struct Cmd {
    #[arg(short, long, help = "Broadcast interface, overrides the alias' one")]
    interface: Option<String>,
    #[arg(short, long, help = "Broadcast ip address [default: 255.255.255.255]")]
    bcast: Option<String>,
    #[arg(short, long, help = "UDP port [default: 9]")]
    port: Option<u16>,
    #[arg(long, help = "Select different config file")]
    config: Option<String>,
    #[arg(long, help = "Select different alias database")]
    database: Option<PathBuf>,
    #[cfg(feature = "log")]
    #[arg(short, action = clap::ArgAction::Count, help = "Set verbosity level")]
    debug: u8,
    #[arg(short, long, help = "Only log errors")]
    quiet: bool,
    #[arg(help = "Command and its arguments, or a mac address/alias to wake")]
    args: Vec<String>,
}

/// Home of the current user, falling back to `/home/<user>`.
pub fn home_dir() -> Option<PathBuf> {
    match home::home_dir() {
        Some(h) => Some(h),
        None => users::get_current_username().map(|u| PathBuf::from("/home").join(u)),
    }
}

impl Cmd {
    pub fn load_cfg(&self, home: &Path) -> Result<Config, RuntimeError> {
        match &self.config {
            Some(f) => {
                debug!("loading configuration from {}", f);
                Config::try_from(f.as_str()).map_err(RuntimeError::from)
            }
            None => Config::load_default(home).map_err(RuntimeError::from),
        }
    }

    pub fn resolver(&self, cfg: &Config) -> WakeResolver {
        WakeResolver::new(cfg.wake_options(self.interface.clone(), self.bcast.clone(), self.port))
    }

    pub fn database_path(&self, cfg: &Config, home: &Path) -> PathBuf {
        match &self.database {
            Some(p) => p.clone(),
            None => cfg.database_path(home),
        }
    }

    pub fn main(&self) -> Result<(), RuntimeError> {
        #[cfg(feature = "log")]
        if let Err(e) = ConsoleLogger::install(self.quiet, self.debug) {
            eprintln!("cannot install logger: {}", e);
        }

        if self.args.is_empty() {
            Self::command().print_help()?;
            return Ok(());
        }

        let operation = Operation::parse(&self.args)?;
        let home = home_dir().ok_or(RuntimeError::NoHomeDir)?;
        let cfg = self.load_cfg(&home)?;
        let resolver = self.resolver(&cfg);
        let db = self.database_path(&cfg, &home);
        debug!("alias database is {:?}", db);

        let mut stdout = std::io::stdout().lock();
        with_store(&db, |store| operation.run(store, &resolver, &UdpSender, &mut stdout))
    }
}

/// Opens the store at `path`, runs `f` and closes the store whatever `f` returned.
pub fn with_store<F>(path: &Path, f: F) -> Result<(), RuntimeError>
where
    F: FnOnce(&mut AliasStore) -> Result<(), RuntimeError>,
{
    let mut store = AliasStore::open(path)?;
    let result = f(&mut store);
    let closed = store.close();
    match (result, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(e)) => Err(RuntimeError::from(e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(c)) => {
            warn!("while closing alias store: {}", c);
            Err(e)
        }
    }
}

/// Parses `args` and runs the operation with a caller supplied sender.
pub fn dispatch<S, W>(
    args: &[String],
    path: &Path,
    resolver: &WakeResolver,
    sender: &S,
    out: &mut W,
) -> Result<(), RuntimeError>
where
    S: PacketSender + ?Sized,
    W: std::io::Write,
{
    let operation = Operation::parse(args)?;
    with_store(path, |store| operation.run(store, resolver, sender, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_anywhere() {
        let cmd = Cmd::try_parse_from(["wol", "wake", "nas", "-i", "eth1", "-p", "7"]).unwrap();
        assert_eq!(cmd.args, vec!["wake".to_owned(), "nas".to_owned()]);
        let r = cmd.resolver(&Config::default());
        assert_eq!(r.options().interface.as_deref(), Some("eth1"));
        assert_eq!(r.destination(), "255.255.255.255:7");
    }

    #[test]
    fn bad_port() {
        assert!(Cmd::try_parse_from(["wol", "-p", "70000", "nas"]).is_err());
    }

    #[test]
    fn database_flag_wins() {
        let cmd = Cmd::try_parse_from(["wol", "--database", "/tmp/a.json", "list"]).unwrap();
        let cfg = Config { database: Some(PathBuf::from("/tmp/b.json")), ..Config::default() };
        assert_eq!(cmd.database_path(&cfg, Path::new("/home/u")), PathBuf::from("/tmp/a.json"));
    }

    #[test]
    fn command_is_consistent() {
        Cmd::command().debug_assert();
    }
}
