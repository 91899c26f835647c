use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "List programs installed on Windows", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "false")]
    pretty: bool,

    /// Restrict the query to per-user or per-machine installations.
    /// Defaults to both.
    #[arg(long, value_enum)]
    scope: Option<ScopeArg>,

    /// Case-insensitive wildcard filter on program names (* and ?).
    /// May be given multiple times; a program matching any pattern is kept.
    #[arg(short, long = "name")]
    name: Vec<String>,

    /// Skip entries that declare a ParentKeyName (sub-components of another
    /// program, such as hotfixes and language packs).
    #[arg(long, default_value = "false")]
    exclude_subentries: bool,

    /// Log skipped registry entries to stderr.
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ScopeArg {
    CurrentUser,
    Machine,
}

#[cfg(windows)]
mod report {
    use chrono::{DateTime, Local};
    use serde::Serialize;
    use winprog_registry::{ProgramRecord, Result};

    /// Serializable projection of one program record. Building it reads
    /// every lazy field once.
    #[derive(Serialize)]
    pub struct ProgramReport {
        pub name: String,
        pub install_date: DateTime<Local>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub publisher: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub size_kb: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub comments: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub install_location: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub install_source: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub modify_path: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub uninstall_string: Option<String>,
        pub no_modify: bool,
        pub no_remove: bool,
        pub no_repair: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub help_link: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub url_info_about: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub url_update_info: Option<String>,
    }

    impl ProgramReport {
        pub fn from_record(record: &ProgramRecord) -> Result<Self> {
            Ok(ProgramReport {
                name: record.name()?.to_string(),
                install_date: record.install_date()?,
                publisher: record.publisher()?.map(str::to_string),
                version: record.version()?.map(|v| v.to_string()),
                size_kb: record.size_kb()?,
                comments: record.comments()?.map(str::to_string),
                install_location: record.install_location()?.map(str::to_string),
                install_source: record.install_source()?.map(str::to_string),
                modify_path: record.modify_path()?.map(str::to_string),
                uninstall_string: record.uninstall_string()?.map(str::to_string),
                no_modify: record.no_modify()?,
                no_remove: record.no_remove()?,
                no_repair: record.no_repair()?,
                help_link: record.help_link()?.map(|u| u.to_string()),
                url_info_about: record.url_info_about()?.map(|u| u.to_string()),
                url_update_info: record.url_update_info()?.map(|u| u.to_string()),
            })
        }
    }
}

#[cfg(windows)]
fn run(args: &Args) -> winprog_registry::Result<Vec<report::ProgramReport>> {
    use winprog_registry::{EnumerationPolicy, Scope};

    let scope = match args.scope {
        Some(ScopeArg::CurrentUser) => Scope::CurrentUser,
        Some(ScopeArg::Machine) => Scope::Machine,
        None => Scope::Unspecified,
    };
    let policy = EnumerationPolicy {
        exclude_child_entries: args.exclude_subentries,
    };

    let mut records = winprog_registry::list_programs_with(scope, &args.name, policy)?;
    let reports = records
        .iter()
        .map(report::ProgramReport::from_record)
        .collect();
    for record in &mut records {
        record.release();
    }
    reports
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    #[cfg(windows)]
    {
        let reports = match run(&args) {
            Ok(reports) => reports,
            Err(error) => {
                eprintln!("winprog: {}", error);
                std::process::exit(1);
            }
        };

        let output = if args.pretty {
            serde_json::to_string_pretty(&reports).unwrap()
        } else {
            serde_json::to_string(&reports).unwrap()
        };
        println!("{}", output);
    }

    #[cfg(not(windows))]
    {
        eprintln!("winprog: the registry is a Windows-only data source");
        std::process::exit(1);
    }
}
