use clap::{
    crate_description, crate_name, crate_version, value_t_or_exit, App, AppSettings, Arg,
    ArgMatches, SubCommand,
};
use solana_clap_utils::{
    input_parsers::pubkey_of,
    input_validators::{is_amount, is_url_or_moniker, is_valid_pubkey},
};
use solana_program::pubkey::Pubkey;
use std::{ffi::OsString, process::exit};

pub struct Args {
    /// Set only when passed explicitly; the default path is resolved later
    pub config_file: Option<String>,
    pub json_rpc_url: Option<String>,
    pub keypair_path: Option<String>,
    pub commitment: Option<String>,
    pub program_id: Option<Pubkey>,
    pub owner: Option<Pubkey>,
    pub dry_run: bool,
    pub command: Command,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Submit(LockCommand),
    Balance { address: Option<Pubkey> },
}

/// Commands that build and submit a TokenLock instruction
#[derive(Clone, Debug, PartialEq)]
pub enum LockCommand {
    Lock { amount: f64 },
    Unlock,
    SetDuration { seconds: i64 },
    ForceUnlock { target: String },
}

fn get_matches<'a, I, T>(args: I) -> ArgMatches<'a>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config_file")
                .short("C")
                .long("config")
                .takes_value(true)
                .value_name("FILEPATH")
                .help("Solana CLI config file [default: ~/.config/solana/cli/config.yml]"),
        )
        .arg(
            Arg::with_name("json_rpc_url")
                .short("u")
                .long("url")
                .value_name("URL_OR_MONIKER")
                .takes_value(true)
                .validator(is_url_or_moniker)
                .help(
                    "URL for Solana's JSON RPC or moniker (or their first letter): \
                       [mainnet-beta, testnet, devnet, localhost]",
                ),
        )
        .arg(
            Arg::with_name("keypair")
                .short("k")
                .long("keypair")
                .value_name("KEYPAIR")
                .takes_value(true)
                .help("Keypair file that signs and pays for transactions"),
        )
        .arg(
            Arg::with_name("commitment")
                .long("commitment")
                .value_name("COMMITMENT_LEVEL")
                .takes_value(true)
                .possible_values(&["processed", "confirmed", "finalized"])
                .help("Commitment level to wait for after submitting"),
        )
        .arg(
            Arg::with_name("program_id")
                .long("program-id")
                .value_name("ADDRESS")
                .takes_value(true)
                .validator(is_valid_pubkey)
                .help("Address of the token lock program"),
        )
        .arg(
            Arg::with_name("owner")
                .long("owner")
                .value_name("ADDRESS")
                .takes_value(true)
                .validator(is_valid_pubkey)
                .help("Address allowed to run owner commands"),
        )
        .arg(
            Arg::with_name("dry_run")
                .long("dry-run")
                .help("Print the instruction as JSON instead of submitting it"),
        )
        .subcommand(
            SubCommand::with_name("lock")
                .about("Lock SOL")
                .setting(AppSettings::AllowNegativeNumbers)
                .arg(
                    Arg::with_name("amount")
                        .index(1)
                        .required(true)
                        .value_name("AMOUNT")
                        .validator(is_amount)
                        .help("The amount to lock, in SOL"),
                ),
        )
        .subcommand(SubCommand::with_name("unlock").about("Unlock previously locked SOL"))
        .subcommand(
            SubCommand::with_name("set-duration")
                .about("Change the lock duration (owner only)")
                .setting(AppSettings::AllowNegativeNumbers)
                .arg(
                    Arg::with_name("seconds")
                        .index(1)
                        .required(true)
                        .value_name("SECONDS")
                        .help("The new lock duration, in seconds"),
                ),
        )
        .subcommand(
            SubCommand::with_name("force-unlock")
                .about("Release another account's lock (owner only)")
                .arg(
                    Arg::with_name("target")
                        .index(1)
                        .required(true)
                        .value_name("ADDRESS")
                        .help("The account whose lock is released"),
                ),
        )
        .subcommand(
            SubCommand::with_name("balance")
                .about("Show an account balance")
                .arg(
                    Arg::with_name("address")
                        .index(1)
                        .value_name("ADDRESS")
                        .validator(is_valid_pubkey)
                        .help("Account to query [default: the keypair's address]"),
                ),
        )
        .get_matches_from(args)
}

fn parse_command(matches: &ArgMatches<'_>) -> Command {
    match matches.subcommand() {
        ("lock", Some(matches)) => Command::Submit(LockCommand::Lock {
            amount: value_t_or_exit!(matches, "amount", f64),
        }),
        ("unlock", Some(_)) => Command::Submit(LockCommand::Unlock),
        ("set-duration", Some(matches)) => Command::Submit(LockCommand::SetDuration {
            seconds: value_t_or_exit!(matches, "seconds", i64),
        }),
        ("force-unlock", Some(matches)) => Command::Submit(LockCommand::ForceUnlock {
            target: value_t_or_exit!(matches, "target", String),
        }),
        ("balance", Some(matches)) => Command::Balance {
            address: pubkey_of(matches, "address"),
        },
        _ => {
            eprintln!("{}", matches.usage());
            exit(1);
        }
    }
}

pub fn parse_args<I, T>(args: I) -> Args
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = get_matches(args);

    Args {
        config_file: matches.value_of("config_file").map(str::to_string),
        json_rpc_url: matches.value_of("json_rpc_url").map(str::to_string),
        keypair_path: matches.value_of("keypair").map(str::to_string),
        commitment: matches.value_of("commitment").map(str::to_string),
        program_id: pubkey_of(&matches, "program_id"),
        owner: pubkey_of(&matches, "owner"),
        dry_run: matches.is_present("dry_run"),
        command: parse_command(&matches),
    }
}
