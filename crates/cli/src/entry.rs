//! Content entry administration.

use failure::Error;
use folio_models::{EntryDraft, EntryKind, EntryStore, Tags, entry};
use std::{fs, path::PathBuf};
use structopt::StructOpt;

use crate::{Result, util::print_table};

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// List entries
    #[structopt(name = "list")]
    List(ListOpts),
    /// Create a new draft entry
    #[structopt(name = "new")]
    New(NewOpts),
    /// Publish an entry
    #[structopt(name = "publish")]
    Publish(PublishOpts),
}

pub fn main<S>(store: &S, opts: Opts) -> Result<(), Error>
where
    S: EntryStore,
{
    match opts.command {
        Command::List(opts) => list(store, opts),
        Command::New(opts) => new(store, opts),
        Command::Publish(opts) => publish(store, opts),
    }
}

#[derive(StructOpt)]
pub struct ListOpts {
    /// Only list entries of this kind
    #[structopt(long = "kind")]
    kind: Option<EntryKind>,
    /// Include drafts
    #[structopt(long = "drafts")]
    drafts: bool,
}

fn list<S: EntryStore>(store: &S, opts: ListOpts) -> Result<()> {
    let rows = entry::list_entries(store, opts.kind, opts.drafts)?
        .into_iter()
        .map(|entry| vec![
            entry.id.to_string(),
            entry.kind.to_string(),
            entry.status.to_string(),
            entry.slug,
            entry.title,
        ])
        .collect::<Vec<_>>();

    print_table(&["ID", "Kind", "Status", "Slug", "Title"], &rows);

    Ok(())
}

#[derive(StructOpt)]
pub struct NewOpts {
    /// Kind of entry
    kind: EntryKind,
    /// Entry's title
    title: String,
    /// File containing entry's body, in plain text
    #[structopt(parse(from_os_str))]
    body: PathBuf,
    /// Comma-separated list of tags
    #[structopt(long = "tags")]
    tags: Option<String>,
    /// Short summary
    #[structopt(long = "summary")]
    summary: Option<String>,
    /// Slug to use instead of one derived from the title
    #[structopt(long = "slug")]
    slug: Option<String>,
}

fn new<S: EntryStore>(store: &S, opts: NewOpts) -> Result<()> {
    let body = fs::read_to_string(&opts.body)?;

    let entry = entry::create_entry(store, &EntryDraft {
        kind: opts.kind,
        title: opts.title,
        slug: opts.slug,
        summary: opts.summary,
        body,
        tags: opts.tags.map_or_else(Tags::default, Tags::Text),
    })?;

    println!("Created {} entry {} ({})", entry.kind, entry.slug, entry.id);

    Ok(())
}

#[derive(StructOpt)]
pub struct PublishOpts {
    /// Entry's ID
    id: i32,
}

fn publish<S: EntryStore>(store: &S, opts: PublishOpts) -> Result<()> {
    let entry = entry::publish_entry(store, opts.id)?;

    println!("Published {} entry {}", entry.kind, entry.slug);

    Ok(())
}
