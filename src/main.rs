use anyhow::Result;
use bitlet::areas::repository::Repository;
use bitlet::errors::RepositoryError;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_FILTER_ENV: &str = "BITLET_LOG";

#[derive(Parser)]
#[command(
    name = "bitlet",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A tiny local version-control system",
    long_about = "bitlet tracks snapshots of a directory in a content-addressed object store, \
    with branches, a staging area and three-way merges. \
    Everything stays local, under the .bitlet directory of the work tree.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path. \
        It creates the root commit and the master branch."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command stages the current content of the given files. \
        A file whose content matches the head commit is unstaged instead."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files to stage")]
        files: Vec<String>,
    },
    #[command(
        name = "rm",
        about = "Unstage a file or stage its removal",
        long_about = "This command drops a pending addition of the file. \
        If the head commit tracks the file, it is also deleted and staged for removal."
    )]
    Rm {
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command freezes the staging area into a new commit on the active branch."
    )]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "branch",
        about = "Create a branch at the active head",
        long_about = "This command creates a new branch pointing at the head of the active branch. \
        It does not switch to it."
    )]
    Branch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(
        name = "rm-branch",
        about = "Delete a branch",
        long_about = "This command deletes a branch pointer. The commits it reached are kept."
    )]
    RmBranch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(
        name = "checkout",
        about = "Switch branches or restore a file",
        long_about = "With a branch name, this command moves the work tree to the head of that branch \
        and makes it active. With `-- <file>`, it restores the file from the head commit, \
        and with `<commit> -- <file>` from the given commit."
    )]
    Checkout {
        #[arg(index = 1, help = "Branch to switch to, or commit to restore from")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "File to restore")]
        file: Option<String>,
    },
    #[command(
        name = "reset",
        about = "Move the active branch to a commit",
        long_about = "This command moves the work tree and the active branch to the given commit \
        and clears the staging area."
    )]
    Reset {
        #[arg(index = 1, help = "Full or abbreviated commit ID")]
        commit: String,
    },
    #[command(
        name = "log",
        about = "Show the history of the active branch",
        long_about = "This command prints every commit from the active head back to the root commit, \
        following first parents."
    )]
    Log,
    #[command(
        name = "global-log",
        about = "Show every commit ever made",
        long_about = "This command prints every commit in the object store, reachable or not."
    )]
    GlobalLog,
    #[command(
        name = "find",
        about = "Print the IDs of commits with the given message",
        long_about = "This command prints the ID of every commit whose message is exactly the given one."
    )]
    Find {
        #[arg(index = 1)]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show the working tree status",
        long_about = "This command lists the branches, the staged additions and removals, \
        unstaged modifications and untracked files."
    )]
    Status,
    #[command(
        name = "merge",
        about = "Merge a branch into the active one",
        long_about = "This command merges the given branch into the active branch. \
        Conflicting files are written with conflict markers and committed as they are."
    )]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of a blob or the body of a commit. \
        It requires the ID of the object to be specified."
    )]
    CatFile {
        #[arg(index = 1, help = "The object ID to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object store",
        long_about = "This command prints the blob ID of a work tree file and can write the blob \
        to the object store."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let message = match RepositoryError::find(&error) {
                Some(repository_error) => repository_error.to_string(),
                None => format!("{:#}", error),
            };
            eprintln!("{}", message.red());

            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::open(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
}

fn run(command: &Commands) -> Result<()> {
    match command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => path.clone(),
                None => std::env::current_dir()?.to_string_lossy().into_owned(),
            };
            let mut repository = Repository::new(&path, Box::new(std::io::stdout()))?;

            repository.init()?
        }
        Commands::Add { files } => open_repository()?.add(files)?,
        Commands::Rm { file } => open_repository()?.rm(file)?,
        Commands::Commit { message } => open_repository()?.commit(message)?,
        Commands::Branch { name } => open_repository()?.branch(name)?,
        Commands::RmBranch { name } => open_repository()?.rm_branch(name)?,
        Commands::Checkout { target, file } => {
            let mut repository = open_repository()?;

            match (target, file) {
                (Some(branch), None) => repository.checkout(branch)?,
                (commit, Some(file)) => repository.checkout_file(commit.as_deref(), file)?,
                (None, None) => anyhow::bail!("Incorrect operands."),
            }
        }
        Commands::Reset { commit } => open_repository()?.reset(commit)?,
        Commands::Log => open_repository()?.log()?,
        Commands::GlobalLog => open_repository()?.global_log()?,
        Commands::Find { message } => open_repository()?.find(message)?,
        Commands::Status => open_repository()?.status()?,
        Commands::Merge { branch } => {
            open_repository()?.merge(branch)?;
        }
        Commands::CatFile { sha } => open_repository()?.cat_file(sha)?,
        Commands::HashObject { write, file } => open_repository()?.hash_object(file, *write)?,
    }

    Ok(())
}
