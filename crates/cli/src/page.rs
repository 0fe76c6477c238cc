//! Page administration.

use failure::{Error, Fail};
use folio_models::{
    ContentStore,
    Editor,
    EditorError,
    PageScaffold,
    PageWithSections,
    StoreError,
    content::{self, ScaffoldError},
};
use log::warn;
use serde::Deserialize;
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
    /// List pages
    #[structopt(name = "list")]
    List,
    /// Show a page with its sections and fields
    #[structopt(name = "show")]
    Show(ShowOpts),
    /// Create pages described in a TOML file
    #[structopt(name = "import")]
    Import(ImportOpts),
    /// Change value of a field and save it as a draft
    #[structopt(name = "set")]
    Set(SetOpts),
    /// Publish a page and all its sections
    #[structopt(name = "publish")]
    Publish(RouteOpts),
    /// Delete a page
    #[structopt(name = "delete")]
    Delete(RouteOpts),
}

pub fn main<S>(store: &S, opts: Opts) -> Result<(), Error>
where
    S: ContentStore,
{
    match opts.command {
        Command::List => list(store),
        Command::Show(opts) => show(store, opts),
        Command::Import(opts) => import(store, opts),
        Command::Set(opts) => set(store, opts),
        Command::Publish(opts) => publish(store, opts),
        Command::Delete(opts) => delete(store, opts),
    }
}

#[derive(Debug, Fail)]
#[fail(display = "No such page: {}", _0)]
struct NoSuchPage(String);

#[derive(Debug, Fail)]
#[fail(display = "No section {} in page {}", _0, _1)]
struct NoSuchSection(String, String);

fn list<S: ContentStore>(store: &S) -> Result<()> {
    let rows = store.all_pages()?
        .into_iter()
        .map(|page| vec![
            page.id.to_string(),
            page.status.to_string(),
            page.route,
            page.page_title,
        ])
        .collect::<Vec<_>>();

    print_table(&["ID", "Status", "Route", "Title"], &rows);

    Ok(())
}

#[derive(StructOpt)]
pub struct ShowOpts {
    /// Page's route
    route: String,
    /// Include draft pages and sections
    #[structopt(long = "drafts")]
    drafts: bool,
}

fn show<S: ContentStore>(store: &S, opts: ShowOpts) -> Result<()> {
    let page = content::get_page_with_sections(store, &opts.route, opts.drafts)?
        .ok_or_else(|| NoSuchPage(opts.route.clone()))?;

    print_tree(&page);

    Ok(())
}

fn print_tree(page: &PageWithSections) {
    println!("{} ({}) [{}]", page.page.route, page.page.page_title, page.page.status);

    if !page.page.meta_description.is_empty() {
        println!("  {}", page.page.meta_description);
    }

    for section in &page.sections {
        println!("  {} <{}> [{}]",
            section.section.section_key,
            section.section.section_type,
            section.section.status);

        for field in &section.fields {
            let value = match field.field_value.as_ref().map(String::as_str) {
                None => "(null)",
                Some("") => "(empty)",
                Some(value) => value,
            };

            println!("    {} ({}) = {}", field.field_key, field.field_type, value);
        }
    }
}

#[derive(StructOpt)]
pub struct ImportOpts {
    /// TOML file describing pages
    #[structopt(parse(from_os_str))]
    file: PathBuf,
}

/// Contents of a file describing pages.
#[derive(Deserialize)]
struct Seed {
    #[serde(default, rename = "page")]
    pages: Vec<PageScaffold>,
}

fn import<S: ContentStore>(store: &S, opts: ImportOpts) -> Result<()> {
    let data = fs::read(&opts.file)?;
    let seed: Seed = toml::from_slice(&data)?;

    for scaffold in &seed.pages {
        match content::create_page(store, scaffold) {
            Ok(page) => println!("Created page {} ({}) with {} sections",
                page.page.route, page.page.id, page.sections.len()),
            Err(ScaffoldError::Store(StoreError::Duplicate(_))) =>
                warn!("Page {} already exists, skipping", scaffold.route),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

#[derive(StructOpt)]
pub struct SetOpts {
    /// Page's route
    route: String,
    /// Section's key
    section: String,
    /// Field's key
    field: String,
    /// New value
    value: String,
}

fn set<S: ContentStore>(store: &S, opts: SetOpts) -> Result<()> {
    let mut editor = Editor::new(store);

    let section = editor.load(&opts.route)?
        .section(&opts.section)
        .map(|s| s.section.id)
        .ok_or_else(|| NoSuchSection(opts.section.clone(), opts.route.clone()))?;

    editor.set_field(section, &opts.field, &opts.value)?;

    match editor.save_section(section) {
        Ok(_) => {
            println!("Saved {}.{} on {} as a draft",
                opts.section, opts.field, opts.route);
            Ok(())
        }
        Err(EditorError::SaveFailed(report)) => {
            if let Some(ref failed) = report.failed {
                eprintln!("Could not write {}: {}", failed.field_key, failed.error);
            }
            Err(EditorError::SaveFailed(report).into())
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(StructOpt)]
pub struct RouteOpts {
    /// Page's route
    route: String,
}

fn publish<S: ContentStore>(store: &S, opts: RouteOpts) -> Result<()> {
    let mut editor = Editor::new(store);
    editor.load(&opts.route)?;

    match editor.publish() {
        Ok(sections) => {
            println!("Published {} with {} sections", opts.route, sections);
            Ok(())
        }
        Err(EditorError::Store(err)) => {
            // The page itself is published at this point.
            eprintln!("Page {} was published, but its sections were not. \
                Run this command again to retry.", opts.route);
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn delete<S: ContentStore>(store: &S, opts: RouteOpts) -> Result<()> {
    let page = store.page_by_route(&opts.route, true)?
        .ok_or_else(|| NoSuchPage(opts.route.clone()))?;

    if !store.delete_page(page.id)? {
        return Err(NoSuchPage(opts.route).into());
    }

    println!("Deleted page {}", opts.route);

    Ok(())
}

#[cfg(test)]
mod tests {
    use folio_models::MemoryStore;

    use super::*;

    const SEED: &str = r#"
        [[page]]
        route = "/about"
        page_title = "About us"

        [[page.sections]]
        section_key = "hero"
        section_type = "hero"
        fields = [
            { field_key = "heading", field_value = "Old" },
            { field_key = "subheading", field_type = "textarea" },
        ]

        [[page]]
        route = "/contact"
        page_title = "Contact"
    "#;

    fn seed(store: &MemoryStore) {
        let seed: Seed = toml::from_str(SEED).unwrap();
        for page in &seed.pages {
            content::create_page(store, page).unwrap();
        }
    }

    #[test]
    fn seed_files_describe_pages() {
        let store = MemoryStore::new();
        seed(&store);

        let about = content::get_page_with_sections(&store, "/about", true)
            .unwrap().unwrap();
        assert_eq!(about.field_value("hero", "heading"), Some("Old"));
        assert_eq!(about.section("hero").unwrap().fields.len(), 2);
        assert_eq!(store.all_pages().unwrap().len(), 2);
    }

    #[test]
    fn demo_seed_is_valid() {
        let seed: Seed = toml::from_str(include_str!("../../../demos/seed.toml"))
            .unwrap();
        let store = MemoryStore::new();

        for page in &seed.pages {
            content::create_page(&store, page).unwrap();
        }

        let routes = store.all_pages().unwrap()
            .into_iter()
            .map(|p| p.route)
            .collect::<Vec<_>>();
        assert_eq!(routes, ["/", "/about", "/contact"]);
    }

    #[test]
    fn set_then_publish() {
        let store = MemoryStore::new();
        seed(&store);

        set(&store, SetOpts {
            route: "/about".to_string(),
            section: "hero".to_string(),
            field: "heading".to_string(),
            value: "New".to_string(),
        }).unwrap();

        // Saved, but still a draft.
        assert!(content::get_page(&store, "/about", false).unwrap().is_none());

        publish(&store, RouteOpts { route: "/about".to_string() }).unwrap();

        let about = content::get_page_content(&store, "/about", false).unwrap();
        assert_eq!(about.field_value("hero", "heading"), Some("New"));
        assert!(about.section("hero").unwrap().section.status.is_published());
    }

    #[test]
    fn set_in_missing_section() {
        let store = MemoryStore::new();
        seed(&store);

        assert!(set(&store, SetOpts {
            route: "/about".to_string(),
            section: "footer".to_string(),
            field: "heading".to_string(),
            value: "x".to_string(),
        }).is_err());
    }

    #[test]
    fn delete_page() {
        let store = MemoryStore::new();
        seed(&store);

        delete(&store, RouteOpts { route: "/contact".to_string() }).unwrap();
        assert!(content::get_page(&store, "/contact", true).unwrap().is_none());
        assert!(delete(&store, RouteOpts { route: "/contact".to_string() }).is_err());
    }
}
