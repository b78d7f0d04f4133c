// preserve-explorer - terminal front end for the map explorer client
// Loads the published collection once, applies filters locally and prints list and markers.

use std::env;
use std::sync::Arc;

use preserve_explorer::{
    client::{
        ClientConfig, Explorer, ExplorerState, ExplorerView, HttpPreserveSource, ListRow, Marker,
        SelectionSource,
    },
    core::PreserveId,
    models::{parse_amenity_list, BoundingBox, GeoPoint},
};

#[derive(Default)]
struct TerminalView {
    list: Vec<ListRow>,
    markers: Vec<Marker>,
    no_matches: bool,
}

impl ExplorerView for TerminalView {
    fn show_loading(&mut self) {
        println!("⏳ Loading preserves...");
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("❌ {}", message);
    }

    fn render_list(&mut self, rows: &[ListRow]) {
        self.no_matches = rows.is_empty();
        self.list = rows.to_vec();
    }

    fn render_markers(&mut self, markers: &[Marker]) {
        self.markers = markers.to_vec();
    }

    fn show_no_matches(&mut self) {
        self.no_matches = true;
    }

    fn highlight_row(&mut self, id: Option<PreserveId>) {
        for row in &mut self.list {
            row.selected = Some(row.id) == id;
        }
    }

    fn center_map(&mut self, at: GeoPoint) {
        println!("🗺️  Map centered at ({:.4}, {:.4})", at.latitude, at.longitude);
    }
}

impl TerminalView {
    fn print(&self) {
        if self.no_matches {
            println!("No preserves match.");
            return;
        }
        println!("📋 Preserves ({}):", self.list.len());
        for row in &self.list {
            let marker = if row.selected { "▶" } else { " " };
            let pin = if row.has_location { "📍" } else { "  " };
            println!("{} {} {:>16}  {}", marker, pin, row.id, row.title);
        }
        println!("🗺️  {} marker(s) on the map", self.markers.len());
    }
}

struct Options {
    collection_url: String,
    search: Option<String>,
    amenities: Option<String>,
    bbox: Option<String>,
    select: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut iter = args.iter().skip(1);
    let collection_url = iter.next().ok_or("missing collection URL")?.clone();
    let mut options = Options {
        collection_url,
        search: None,
        amenities: None,
        bbox: None,
        select: None,
    };

    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for {}", flag))?
            .clone();
        match flag.as_str() {
            "--search" => options.search = Some(value),
            "--amenities" => options.amenities = Some(value),
            "--bbox" => options.bbox = Some(value),
            "--select" => options.select = Some(value),
            other => return Err(format!("unknown option {}", other)),
        }
    }
    Ok(options)
}

fn usage() {
    eprintln!("Usage: preserve-explorer <collection-url> [options]");
    eprintln!("Options:");
    eprintln!("  --search <text>                        Filter by title or description");
    eprintln!("  --amenities <a,b>                      Require every listed amenity");
    eprintln!("  --bbox <minLat,minLon,maxLat,maxLon>   Only show preserves in this viewport");
    eprintln!("  --select <id>                          Select a preserve");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            usage();
            std::process::exit(2);
        }
    };

    let source = HttpPreserveSource::new(ClientConfig::new(options.collection_url))?;
    let mut explorer = Explorer::new(Arc::new(source), TerminalView::default());
    explorer.load().await;

    if let ExplorerState::Error(_) = explorer.state() {
        std::process::exit(1);
    }

    if let Some(text) = &options.search {
        explorer.set_search_text(text);
    }
    if let Some(raw) = &options.amenities {
        explorer.set_amenities(parse_amenity_list(raw)?);
    }
    if let Some(raw) = &options.bbox {
        explorer.set_viewport(Some(raw.parse::<BoundingBox>()?));
        explorer.set_viewport_filtering(true);
    }
    if let Some(raw) = &options.select {
        let id: PreserveId = raw.parse()?;
        if !explorer.select(id, SelectionSource::ListRow) {
            eprintln!("Preserve {} is not in the current list", id);
        }
    }

    if let Some(criteria) = explorer.criteria().filter(|c| !c.is_empty()) {
        let amenities: Vec<&str> = criteria.amenities.iter().map(|a| a.as_str()).collect();
        println!(
            "🔎 Filters: text '{}', amenities [{}], viewport {}",
            criteria.text(),
            amenities.join(", "),
            if criteria.viewport_filtering { "on" } else { "off" }
        );
    }
    explorer.view().print();
    Ok(())
}
