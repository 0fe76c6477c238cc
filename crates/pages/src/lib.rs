//! Folio's public site.

use actix_web::{
    HttpResponse,
    http::StatusCode,
    web::{self, Data, Path, ServiceConfig},
};
use folio_models::{Entry, EntryKind, PageWithSections, content, entry};
use folio_web::Store;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use tera::Tera;

type Result<T, E=folio_error::Error> = std::result::Result<T, E>;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("contact.html", include_str!("../templates/contact.html")),
    ("listing.html", include_str!("../templates/listing.html")),
    ("entry.html", include_str!("../templates/entry.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
];

/// Compiled templates of the public site.
///
/// Create once during startup and register with `App::data`.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Templates, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Templates { tera })
    }

    /// Render a named template with a given context and given status code.
    fn render<T>(&self, code: StatusCode, name: &str, context: &T)
    -> Result<HttpResponse>
    where
        T: Serialize,
    {
        let body = self.tera.render(name, context)?;

        Ok(HttpResponse::build(code)
            .content_type("text/html; charset=utf-8")
            .body(body))
    }
}

/// Configure routes.
pub fn configure(app: &mut ServiceConfig) {
    app
        .route("/", web::get().to(home))
        .route("/about", web::get().to(about))
        .route("/contact", web::get().to(contact))
        .route("/{listing}", web::get().to(listing))
        .route("/{listing}/{slug}", web::get().to(show_entry))
    ;
}

/// A single value taken from the CMS.
struct Slot {
    section: &'static str,
    field: &'static str,
    /// Text used when the CMS has no value for this slot.
    default: &'static str,
}

/// A page whose text comes from the CMS.
struct Layout {
    route: &'static str,
    template: &'static str,
    title: &'static str,
    slots: &'static [Slot],
}

macro_rules! slots {
    ($($section:ident . $field:ident => $default:expr),* $(,)*) => {
        &[$(Slot {
            section: stringify!($section),
            field: stringify!($field),
            default: $default,
        }),*]
    };
}

static HOME: Layout = Layout {
    route: "/",
    template: "home.html",
    title: "Folio",
    slots: slots! {
        hero.heading => "Software that works for you",
        hero.subheading => "We design, build and run dependable systems.",
        hero.button_primary_text => "Get in touch",
        hero.button_primary_url => "/contact",
        services.heading => "What we do",
        services.text => "From first prototype to production operations.",
        cta.heading => "Have a project in mind?",
        cta.button_text => "Talk to us",
        cta.button_url => "/contact",
    },
};

static ABOUT: Layout = Layout {
    route: "/about",
    template: "about.html",
    title: "About us",
    slots: slots! {
        hero.heading => "About us",
        hero.subheading => "A small team with a long track record.",
        story.heading => "Our story",
        story.body => "We started as a handful of engineers helping friends ship.",
        values.heading => "What we value",
        values.body => "Clear communication, careful engineering, and honest estimates.",
        cta.heading => "Want to work with us?",
        cta.button_text => "See open positions",
        cta.button_url => "/careers",
    },
};

static CONTACT: Layout = Layout {
    route: "/contact",
    template: "contact.html",
    title: "Contact",
    slots: slots! {
        hero.heading => "Get in touch",
        hero.subheading => "Tell us about your project and we'll get back to you.",
        details.heading => "Contact details",
        details.email => "hello@example.com",
        details.phone => "+1 555 0100",
        details.address => "1 Example Street, Springfield",
    },
};

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    description: &'a str,
    /// Values of slots, by section key and field key.
    content: BTreeMap<&'a str, BTreeMap<&'a str, &'a str>>,
}

impl<'a> PageContext<'a> {
    fn new(layout: &'a Layout, page: Option<&'a PageWithSections>) -> Self {
        let mut values = BTreeMap::new();

        for slot in layout.slots {
            let section = page.and_then(|page| page.section(slot.section));
            let value = content::field_value(section, slot.field)
                .unwrap_or(slot.default);

            values.entry(slot.section)
                .or_insert_with(BTreeMap::new)
                .insert(slot.field, value);
        }

        PageContext {
            title: page.map(|p| p.page.page_title.as_str())
                .filter(|t| !t.is_empty())
                .unwrap_or(layout.title),
            description: page.map_or("", |p| p.page.meta_description.as_str()),
            content: values,
        }
    }
}

fn render_layout(store: &Store, templates: &Templates, layout: &Layout)
-> Result<HttpResponse> {
    let page = content::get_page_content(&**store, layout.route, false);
    let context = PageContext::new(layout, page.as_ref());

    templates.render(StatusCode::OK, layout.template, &context)
}

/// Render the home page.
///
/// ## Method
///
/// ```text
/// GET /
/// ```
fn home(store: Store, templates: Data<Templates>) -> Result<HttpResponse> {
    render_layout(&store, &templates, &HOME)
}

/// ## Method
///
/// ```text
/// GET /about
/// ```
fn about(store: Store, templates: Data<Templates>) -> Result<HttpResponse> {
    render_layout(&store, &templates, &ABOUT)
}

/// ## Method
///
/// ```text
/// GET /contact
/// ```
fn contact(store: Store, templates: Data<Templates>) -> Result<HttpResponse> {
    render_layout(&store, &templates, &CONTACT)
}

#[derive(Serialize)]
struct EntryView<'a> {
    #[serde(flatten)]
    entry: &'a Entry,
    /// Human-readable publication date.
    date: String,
}

impl<'a> EntryView<'a> {
    fn new(entry: &'a Entry) -> Self {
        EntryView {
            entry,
            date: entry.published_at.unwrap_or(entry.created)
                .format("%B %-d, %Y")
                .to_string(),
        }
    }
}

fn listing_title(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Blog => "Blog",
        EntryKind::CaseStudy => "Case studies",
        EntryKind::Job => "Careers",
        EntryKind::Service => "Services",
        EntryKind::Support => "Support",
    }
}

#[derive(Serialize)]
struct ListingContext<'a> {
    title: &'static str,
    description: &'static str,
    listing: &'static str,
    entries: Vec<EntryView<'a>>,
}

/// List published entries of a single kind.
///
/// ## Method
///
/// ```text
/// GET /:listing
/// ```
fn listing(store: Store, templates: Data<Templates>, path: Path<String>)
-> Result<HttpResponse> {
    let kind = match EntryKind::from_listing(&path) {
        Some(kind) => kind,
        None => return not_found(&templates),
    };

    let entries = entry::list_entries(&*store, Some(kind), false)?;

    templates.render(StatusCode::OK, "listing.html", &ListingContext {
        title: listing_title(kind),
        description: "",
        listing: kind.listing(),
        entries: entries.iter().map(EntryView::new).collect(),
    })
}

#[derive(Serialize)]
struct EntryContext<'a> {
    title: &'a str,
    description: &'a str,
    listing: &'static str,
    entry: EntryView<'a>,
}

/// Render a single published entry.
///
/// ## Method
///
/// ```text
/// GET /:listing/:slug
/// ```
fn show_entry(store: Store, templates: Data<Templates>, path: Path<(String, String)>)
-> Result<HttpResponse> {
    let (listing, slug) = path.into_inner();

    let kind = match EntryKind::from_listing(&listing) {
        Some(kind) => kind,
        None => return not_found(&templates),
    };

    let entry = match entry::entry_by_slug(&*store, kind, &slug, false)? {
        Some(entry) => entry,
        None => {
            debug!("No published {} entry {}", kind, slug);
            return not_found(&templates);
        }
    };

    templates.render(StatusCode::OK, "entry.html", &EntryContext {
        title: &entry.title,
        description: entry.summary.as_ref().map_or("", String::as_str),
        listing: kind.listing(),
        entry: EntryView::new(&entry),
    })
}

#[derive(Serialize)]
struct NotFoundContext {
    title: &'static str,
    description: &'static str,
}

fn not_found(templates: &Templates) -> Result<HttpResponse> {
    templates.render(StatusCode::NOT_FOUND, "not_found.html", &NotFoundContext {
        title: "Page not found",
        description: "",
    })
}
