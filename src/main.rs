//! lectern - Dump the readable content of an (X)HTML file

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use lectern::util::media_type_for_path;
use lectern::{
    ContentElement, ContentIterator, FileResource, HtmlParser, HtmlResourceContentIterator,
    Locator, Strictness,
};

#[derive(Parser)]
#[command(name = "lectern")]
#[command(version, about = "Dump the readable content of an (X)HTML file", long_about = None)]
#[command(after_help = "EXAMPLES:
    lectern chapter1.xhtml                   List every element
    lectern chapter1.xhtml -s '#note-3'      Start at an element
    lectern chapter1.xhtml --from-end -b     List backward from the end
    lectern chapter1.xhtml --json            One JSON object per line")]
struct Cli {
    /// Input file (XHTML or HTML)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Href of the resource in its publication (defaults to the file name)
    #[arg(long)]
    href: Option<String>,

    /// Media type of the resource (guessed from the extension otherwise)
    #[arg(long)]
    media_type: Option<String>,

    /// CSS selector of the element to start at
    #[arg(short, long, value_name = "SELECTOR", conflicts_with = "from_end")]
    start: Option<String>,

    /// Start after the last element
    #[arg(long)]
    from_end: bool,

    /// Walk toward the beginning instead of the end
    #[arg(short, long)]
    backward: bool,

    /// Print one JSON object per element
    #[arg(long)]
    json: bool,

    /// Fail on markup errors instead of recovering
    #[arg(long)]
    strict: bool,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    match dump(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn dump(cli: &Cli) -> Result<(), String> {
    let path = Path::new(&cli.input);
    let href = match &cli.href {
        Some(href) => href.clone(),
        None => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| format!("{}: not a file", cli.input))?,
    };
    let media_type = match &cli.media_type {
        Some(media_type) => media_type.clone(),
        None => media_type_for_path(&cli.input)
            .ok_or_else(|| format!("{}: unknown media type, use --media-type", cli.input))?
            .to_string(),
    };

    let mut locator = Locator::new(&href, &media_type);
    if let Some(selector) = &cli.start {
        locator = locator.with_css_selector(selector);
    }
    if cli.from_end {
        locator = locator.with_progression(1.0);
    }

    let strictness = if cli.strict {
        Strictness::Strict
    } else {
        Strictness::Lenient
    };
    let parser = HtmlParser::new().with_strictness(strictness);
    let resource = FileResource::new(href, media_type, path);
    let mut iter = HtmlResourceContentIterator::with_parser(resource, parser, None, locator);

    loop {
        let element = if cli.backward {
            iter.previous()
        } else {
            iter.next()
        }
        .map_err(|e| e.to_string())?;

        let Some(element) = element else {
            break;
        };
        if cli.json {
            let line = serde_json::to_string(&element).map_err(|e| e.to_string())?;
            println!("{line}");
        } else {
            print_element(&element);
        }
    }

    Ok(())
}

fn print_element(element: &ContentElement) {
    let locations = &element.locator().locations;
    let progression = locations.progression.unwrap_or_default();
    let selector = locations.css_selector.as_deref().unwrap_or("-");

    let (kind, body) = match element {
        ContentElement::Text(text) => ("text", text.text()),
        ContentElement::Image(image) => ("image", image.embedded_link.href.clone()),
        ContentElement::Audio(audio) => ("audio", audio.embedded_link.href.clone()),
        ContentElement::Video(video) => ("video", video.embedded_link.href.clone()),
    };

    println!("[{progression:.3}] {kind:<5} {selector}");
    for line in body.lines() {
        println!("    {line}");
    }
    if let Some(label) = element.accessibility_label() {
        println!("    ({label})");
    }
}
