//! Cursor tests over complete XHTML resources.
//!
//! The main document is an excerpt of Project Gutenberg's "Fairy Stories"
//! section, kept in `tests/fixtures/fairy-stories.xhtml`.

use std::fs;

use lectern::{
    ContentAttribute, ContentElement, ContentIterator, FileResource,
    HtmlResourceContentIterator, HtmlResourceContentIteratorFactory, Link, Locator, LocatorText,
    MemoryResource, Segment, TextContentElement, TextRole,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

const HREF: &str = "/dir/res.xhtml";
const MEDIA_TYPE: &str = "application/xhtml+xml";

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn fairy_stories() -> String {
    fs::read_to_string(fixture_path("fairy-stories.xhtml")).expect("Failed to read fixture")
}

fn base() -> Locator {
    Locator::new(HREF, MEDIA_TYPE)
}

fn locator(progression: f64, selector: &str, before: Option<&str>, highlight: Option<&str>) -> Locator {
    base()
        .with_progression(progression)
        .with_css_selector(selector)
        .with_text(LocatorText::new(
            before.map(str::to_string),
            highlight.map(str::to_string),
            None,
        ))
}

fn text(
    progression: f64,
    selector: &str,
    before: Option<&str>,
    highlight: &str,
    language: Option<&str>,
) -> ContentElement {
    let locator = locator(progression, selector, before, Some(highlight));
    ContentElement::Text(TextContentElement {
        locator: locator.clone(),
        role: TextRole::Body,
        segments: vec![Segment {
            locator,
            text: highlight.to_string(),
            attributes: language.map(ContentAttribute::language).into_iter().collect(),
        }],
        attributes: vec![],
    })
}

fn iterator(html: &str, start: Option<Locator>) -> HtmlResourceContentIterator<MemoryResource> {
    let resource = MemoryResource::new(HREF, MEDIA_TYPE, html);
    HtmlResourceContentIterator::new(resource, None, start.unwrap_or_else(base))
}

fn highlights(elements: &[ContentElement]) -> Vec<String> {
    elements
        .iter()
        .filter_map(|e| e.locator().text.highlight.clone())
        .collect()
}

fn selectors(elements: &[ContentElement]) -> Vec<String> {
    elements
        .iter()
        .filter_map(|e| e.locator().locations.css_selector.clone())
        .collect()
}

const P3: &str = "The difficulties of classification are very apparent here, and once more it must be noted that illustrative and practical purposes rather than logical ones are served by the arrangement adopted. The modern fanciful story is here placed next to the real folk story instead of after all the groups of folk products. The Hebrew stories at the beginning belong quite as well, perhaps even better, in Section V, while the stories at the end of Section VI shade off into the more modern types of short tales.";
const P4: &str = "The child's natural literature. The world has lost certain secrets as the price of an advancing civilization.";
const P5: &str = "Without discussing the limits of the culture-epoch theory of human development as a complete guide in education, it is clear that the young child passes through a period when his mind looks out upon the world in a manner analogous to that of the folk as expressed in their literature.";

fn fairy_story_elements() -> Vec<ContentElement> {
    let en = Some("en");
    vec![
        text(0.0, "#pgepubid00498 > div.center", None, "171", en),
        text(0.2, "#pgepubid00498 > h3", Some("171"), "INTRODUCTORY", en),
        text(0.4, "#pgepubid00498 > p:nth-child(3)", Some("171INTRODUCTORY"), P3, en),
        text(
            0.6,
            "#pgepubid00498 > p:nth-child(4)",
            Some("ade off into the more modern types of short tales."),
            P4,
            en,
        ),
        text(
            0.8,
            "#pgepubid00498 > p:nth-child(5)",
            Some("secrets as the price of an advancing civilization."),
            P5,
            en,
        ),
    ]
}

// ============================================================================
// Cursor Movement
// ============================================================================

#[test]
fn test_iterate_from_start_to_finish() {
    let elements = fairy_story_elements();
    let mut iter = iterator(&fairy_stories(), None);

    for expected in &elements {
        assert_eq!(Some(expected), iter.next().unwrap().as_ref());
    }
    assert!(iter.next().unwrap().is_none());
}

#[test]
fn test_previous_is_none_from_the_beginning() {
    let mut iter = iterator(&fairy_stories(), None);
    assert!(iter.previous().unwrap().is_none());
}

#[test]
fn test_next_then_previous_returns_none() {
    let elements = fairy_story_elements();
    let mut iter = iterator(&fairy_stories(), None);

    assert_eq!(Some(elements[0].clone()), iter.next().unwrap());
    assert!(iter.previous().unwrap().is_none());
}

#[test]
fn test_next_twice_then_previous_returns_the_first_element() {
    let elements = fairy_story_elements();
    let mut iter = iterator(&fairy_stories(), None);

    assert_eq!(Some(elements[0].clone()), iter.next().unwrap());
    assert_eq!(Some(elements[1].clone()), iter.next().unwrap());
    assert_eq!(Some(elements[0].clone()), iter.previous().unwrap());
}

#[test]
fn test_next_after_end_stays_at_end() {
    let mut iter = iterator(&fairy_stories(), None);
    assert_eq!(iter.collect_remaining().unwrap().len(), 5);

    assert!(iter.next().unwrap().is_none());
    assert!(iter.next().unwrap().is_none());
    assert_eq!(
        iter.previous().unwrap().and_then(|e| e.text()).as_deref(),
        Some(P4)
    );
}

// ============================================================================
// Starting Position
// ============================================================================

#[test]
fn test_starting_from_css_selector() {
    let elements = fairy_story_elements();
    let start = base().with_css_selector("#pgepubid00498 > p:nth-child(3)");
    let mut iter = iterator(&fairy_stories(), Some(start));

    assert_eq!(Some(elements[2].clone()), iter.next().unwrap());
    assert_eq!(Some(elements[3].clone()), iter.next().unwrap());
    assert_eq!(Some(elements[4].clone()), iter.next().unwrap());
    assert!(iter.next().unwrap().is_none());
}

#[test]
fn test_calling_previous_when_starting_from_css_selector() {
    let elements = fairy_story_elements();
    let start = base().with_css_selector("#pgepubid00498 > p:nth-child(3)");
    let mut iter = iterator(&fairy_stories(), Some(start));

    assert_eq!(Some(elements[1].clone()), iter.previous().unwrap());
}

#[test]
fn test_starting_from_the_end() {
    let mut iter = iterator(&fairy_stories(), Some(base().with_progression(1.0)));

    assert_eq!(iter.next().unwrap().and_then(|e| e.text()).as_deref(), Some(P5));
    assert!(iter.next().unwrap().is_none());
    assert_eq!(iter.previous().unwrap().and_then(|e| e.text()).as_deref(), Some(P4));
}

#[test]
fn test_starting_from_the_end_of_an_empty_resource() {
    let mut iter = iterator("<html><body></body></html>", Some(base().with_progression(1.0)));
    assert!(iter.next().unwrap().is_none());
    assert!(iter.previous().unwrap().is_none());
}

const FRENCH_WITHOUT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="fr">
<body>
    <p>Tout au loin sur la chaussée, aussi loin qu’on pouvait voir</p>
    <p>Lui, notre colonel, savait peut-être pourquoi ces deux gens-là tiraient <span>[...]</span> On buvait de la bière sucrée.</p>
</body>
</html>"#;

const FRENCH_WITH_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="fr">
<head></head>
<body>
    <p>Tout au loin sur la chaussée, aussi loin qu’on pouvait voir</p>
    <p>Lui, notre colonel, savait peut-être pourquoi ces deux gens-là tiraient <span>[...]</span> On buvait de la bière sucrée.</p>
</body>
</html>"#;

#[test]
fn test_starting_from_root_selector_to_block_containing_inline_element() {
    let expected = text(
        0.5,
        "html > body > p:nth-child(2)",
        Some("oin sur la chaussée, aussi loin qu’on pouvait voir"),
        "Lui, notre colonel, savait peut-être pourquoi ces deux gens-là tiraient [...] On buvait de la bière sucrée.",
        Some("fr"),
    );

    for html in [FRENCH_WITHOUT_HEAD, FRENCH_WITH_HEAD] {
        let start = base().with_css_selector(":root > :nth-child(2) > :nth-child(2)");
        let mut iter = iterator(html, Some(start));
        assert_eq!(Some(expected.clone()), iter.next().unwrap());
    }
}

// ============================================================================
// Embedded Media
// ============================================================================

#[test]
fn test_iterating_over_image_elements() {
    let html = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<body>
    <img src="image.png"/>
    <img src="../cover.jpg" alt="Accessibility description" />
</body>
</html>"#;

    let mut iter = iterator(html, None);
    let elements = iter.collect_remaining().unwrap();
    assert_eq!(elements.len(), 2);

    let ContentElement::Image(first) = &elements[0] else {
        panic!("expected an image, got {:?}", elements[0]);
    };
    assert_eq!(first.locator, locator(0.0, "html > body > img:nth-child(1)", None, None));
    assert_eq!(first.embedded_link, Link::new("/dir/image.png"));
    assert_eq!(first.caption, None);
    assert!(first.attributes.is_empty());

    let ContentElement::Image(second) = &elements[1] else {
        panic!("expected an image, got {:?}", elements[1]);
    };
    assert_eq!(second.locator, locator(0.5, "html > body > img:nth-child(2)", None, None));
    assert_eq!(second.embedded_link, Link::new("/cover.jpg"));
    assert_eq!(
        second.attributes,
        [ContentAttribute::accessibility_label("Accessibility description")]
    );
}

#[test]
fn test_iterating_over_audio_elements() {
    let html = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<body>
    <audio src="audio.mp3"></audio>
    <audio>
        <source src="audio.mp3" type="audio/mp3" />
        <source src="audio.ogg" type="audio/ogg" />
    </audio>
</body>
</html>"#;

    let elements = iterator(html, None).collect_remaining().unwrap();
    assert_eq!(elements.len(), 2);

    let ContentElement::Audio(first) = &elements[0] else {
        panic!("expected audio, got {:?}", elements[0]);
    };
    assert_eq!(first.locator, locator(0.0, "html > body > audio:nth-child(1)", None, None));
    assert_eq!(first.embedded_link, Link::new("/dir/audio.mp3"));

    let ContentElement::Audio(second) = &elements[1] else {
        panic!("expected audio, got {:?}", elements[1]);
    };
    assert_eq!(second.locator, locator(0.5, "html > body > audio:nth-child(2)", None, None));
    assert_eq!(
        second.embedded_link,
        Link::new("/dir/audio.mp3")
            .with_media_type("audio/mp3")
            .with_alternates(vec![Link::new("/dir/audio.ogg").with_media_type("audio/ogg")])
    );
}

#[test]
fn test_iterating_over_video_elements() {
    let html = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<body>
    <video src="video.mp4"></video>
    <video>
        <source src="video.mp4" type="video/mp4" />
        <source src="video.m4v" type="video/x-m4v" />
    </video>
</body>
</html>"#;

    let elements = iterator(html, None).collect_remaining().unwrap();
    assert_eq!(elements.len(), 2);

    let ContentElement::Video(first) = &elements[0] else {
        panic!("expected video, got {:?}", elements[0]);
    };
    assert_eq!(first.locator, locator(0.0, "html > body > video:nth-child(1)", None, None));
    assert_eq!(first.embedded_link, Link::new("/dir/video.mp4"));

    let ContentElement::Video(second) = &elements[1] else {
        panic!("expected video, got {:?}", elements[1]);
    };
    assert_eq!(second.locator, locator(0.5, "html > body > video:nth-child(2)", None, None));
    assert_eq!(
        second.embedded_link,
        Link::new("/dir/video.mp4")
            .with_media_type("video/mp4")
            .with_alternates(vec![Link::new("/dir/video.m4v").with_media_type("video/x-m4v")])
    );
}

// ============================================================================
// Block Structure
// ============================================================================

#[test]
fn test_element_containing_both_a_text_node_and_child_elements() {
    let html = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<body>
    <ol class="decimal" id="c06-list-0001">
        <li id="c06-li-0001">Let&#39;s start at the top&#8212;the <i>source of ideas</i>.
            <aside><div class="top hr"><hr/></div>
            <section class="feature1">
                <p id="c06-para-0019"><i>While almost everyone today claims to be Agile, what I&#39;ve just described is very much a <i>waterfall</i> process.</i></p>
            </section>
            Trailing text
        </li>
    </ol>
</body>
</html>"#;

    let elements = iterator(html, None).collect_remaining().unwrap();
    assert_eq!(
        highlights(&elements),
        [
            "Let's start at the top—the source of ideas.",
            "While almost everyone today claims to be Agile, what I've just described is very much a waterfall process.",
            "Trailing text",
        ]
    );
    assert_eq!(
        selectors(&elements),
        ["#c06-li-0001", "#c06-para-0019", "#c06-li-0001 > aside"]
    );

    let progressions: Vec<_> = elements
        .iter()
        .filter_map(|e| e.locator().locations.progression)
        .collect();
    assert_eq!(progressions, [0.0, 1.0 / 3.0, 2.0 / 3.0]);
    assert!(elements.iter().all(|e| e.language().is_none()));
}

#[test]
fn test_text_nodes_located_around_a_nested_block_element() {
    let html = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<body>
    <div id="a">begin a <div id="b">in b</div> end a</div>
    <div id="c">in c</div>
</body>
</html>"#;

    let elements = iterator(html, None).collect_remaining().unwrap();
    assert_eq!(highlights(&elements), ["begin a", "in b", "end a", "in c"]);
    assert_eq!(selectors(&elements), ["#a", "#b", "#a", "#c"]);
    assert_eq!(elements[1].locator().text.before.as_deref(), Some("begin a "));
    assert_eq!(elements[3].locator().text.before.as_deref(), Some("begin a in b end a"));
}

#[test]
fn test_code_block_between_paragraphs() {
    let html = r#"<p>And: </p>
<pre><code><span class="token keyword">struct</span> <span class="token builtin">MenuItem</span><span class="token punctuation">:</span> <span class="token builtin">Codable</span><span class="token punctuation">,</span> <span class="token builtin">Equatable</span><span class="token punctuation">,</span> <span class="token builtin">Identifiable</span> <span class="token punctuation">{</span></code></pre>
<p>If you run the code now you’ll see twelve rows containing “Hello World” – something you might not have expected.</p>"#;

    let elements = iterator(html, None).collect_remaining().unwrap();
    assert_eq!(elements.len(), 3);

    let roles: Vec<_> = elements
        .iter()
        .filter_map(|e| e.as_text().map(|t| t.role))
        .collect();
    assert_eq!(roles, [TextRole::Body, TextRole::CodeBlock, TextRole::Body]);

    assert_eq!(elements[0].text().as_deref(), Some("And:"));
    assert_eq!(
        elements[1].text().as_deref(),
        Some("struct MenuItem: Codable, Equatable, Identifiable {")
    );
    assert_eq!(
        elements[1].locator().locations.css_selector.as_deref(),
        Some("html > body > pre")
    );
    assert!(elements[2].text().is_some_and(|t| t.starts_with("If you run the code now")));
}

#[test]
fn test_code_lines_keep_their_indentation() {
    let html = concat!(
        r#"<div class="code">"#,
        r#"<div class="line" style="padding-left:0.0em;margin-left:1.5em;text-indent:-1.5em;"><span class="kd">extension</span> <span class="nc">GPSTrack</span> <span class="p">{</span>"#,
        "\n</div>",
        r#"<div class="line" style="padding-left:1.5em;margin-left:1.5em;text-indent:-1.5em;"><span class="kd">var</span> <span class="nv">timestamps</span><span class="p">:</span> <span class="p">[</span><span class="n">Date</span><span class="p">]</span> <span class="p">{</span>"#,
        "\n</div>",
        r#"<div class="line" style="padding-left:3.0em;margin-left:1.5em;text-indent:-1.5em;"><span class="k">return</span> <span class="n">record</span><span class="p">.</span><span class="bp">map</span> <span class="p">{</span> <span class="nv">$0</span><span class="p">.</span><span class="mi">1</span> <span class="p">}</span>"#,
        "\n</div>",
        "</div>",
    );

    let elements = iterator(html, None).collect_remaining().unwrap();
    let lines: Vec<_> = elements.iter().filter_map(|e| e.text()).collect();
    assert_eq!(
        lines,
        [
            "   extension GPSTrack {\n",
            "      var timestamps: [Date] {\n",
            "         return record.map { $0.1 }\n",
        ]
    );
}

#[test]
fn test_code_retains_internal_blank_lines() {
    let html = concat!(
        "<p>Before</p>",
        "<pre>fn one() {}<br/><br/>fn two() {}</pre>",
        r#"<div class="code"><div class="line">let a = 1;</div><div class="line"></div><div class="line">let b = 2;</div></div>"#,
    );

    let mut iter = iterator(html, None);
    let elements = iter.collect_remaining().unwrap();
    let lines: Vec<_> = elements.iter().filter_map(|e| e.text()).collect();
    assert_eq!(
        lines,
        ["Before", "fn one() {}", "", "fn two() {}", "let a = 1;", "", "let b = 2;"]
    );

    let mut back = vec![elements.last().cloned().expect("last element")];
    while let Some(element) = iter.previous().unwrap() {
        back.push(element);
    }
    back.reverse();
    assert_eq!(back, elements);
}

#[test]
fn test_languages_split_segments() {
    let html = r#"<html lang="en"><body><p>The French say <span lang="fr">bonjour</span> here.</p></body></html>"#;

    let elements = iterator(html, None).collect_remaining().unwrap();
    let text = elements[0].as_text().expect("text element");
    let segments: Vec<_> = text
        .segments
        .iter()
        .map(|s| (s.text.as_str(), s.language()))
        .collect();
    assert_eq!(
        segments,
        [
            ("The French say ", Some("en")),
            ("bonjour", Some("fr")),
            (" here.", Some("en")),
        ]
    );
    assert_eq!(text.text(), "The French say bonjour here.");
    assert_eq!(elements[0].language(), Some("en"));
}

// ============================================================================
// Resources and Publication Progression
// ============================================================================

#[test]
fn test_reading_from_file_with_total_progression() {
    let resource = FileResource::new(HREF, MEDIA_TYPE, fixture_path("fairy-stories.xhtml"));
    let mut iter = HtmlResourceContentIterator::new(resource, Some(0.2..=0.4), base());

    let elements = iter.collect_remaining().unwrap();
    assert_eq!(elements.len(), 5);
    for (i, element) in elements.iter().enumerate() {
        let total = element.locator().locations.total_progression.unwrap();
        let expected = 0.2 + (i as f64 / 5.0) * 0.2;
        assert!((total - expected).abs() < 1e-9, "{total} != {expected}");
    }

    assert!(!iter.resource().is_loaded());
}

#[test]
fn test_factory_bounds_total_progression() {
    let position = |total: f64| vec![Locator::new("x", MEDIA_TYPE).with_total_progression(total)];
    let positions = vec![position(0.0), position(0.5)];
    let factory = HtmlResourceContentIteratorFactory::new();

    let resource = MemoryResource::new(HREF, MEDIA_TYPE, "<p>one</p><p>two</p>");
    let mut iter = factory.make(&positions, 1, resource, base()).expect("HTML resource");

    let totals: Vec<_> = iter
        .collect_remaining()
        .unwrap()
        .iter()
        .filter_map(|e| e.locator().locations.total_progression)
        .collect();
    assert_eq!(totals, [0.5, 0.75]);
}

#[test]
fn test_factory_skips_non_html_resources() {
    let factory = HtmlResourceContentIteratorFactory::new();
    let resource = MemoryResource::new("/cover.jpg", "image/jpeg", vec![0xFFu8, 0xD8]);
    assert!(factory.make(&[], 0, resource, base()).is_none());
}

#[test]
fn test_missing_file_fails_every_time() {
    let dir = tempfile::tempdir().unwrap();
    let resource = FileResource::new(HREF, MEDIA_TYPE, dir.path().join("missing.xhtml"));
    let mut iter = HtmlResourceContentIterator::new(resource, None, base());

    assert!(matches!(
        iter.next(),
        Err(lectern::Error::ResourceUnavailable { .. })
    ));
    assert!(matches!(
        iter.previous(),
        Err(lectern::Error::ResourceUnavailable { .. })
    ));
}

#[test]
fn test_heading_and_paragraph() {
    let html = "<html><body><h3>INTRODUCTORY</h3><p>The difficulties of classification.</p></body></html>";
    let elements = iterator(html, None).collect_remaining().unwrap();

    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].locator().locations.progression, Some(0.0));
    assert_eq!(elements[1].locator().locations.progression, Some(0.5));
    assert_eq!(elements[1].locator().text.before.as_deref(), Some("INTRODUCTORY"));
}

#[test]
fn test_resuming_from_an_emitted_locator() {
    let html = fairy_stories();
    let elements = iterator(&html, None).collect_remaining().unwrap();

    for element in &elements {
        let mut iter = iterator(&html, Some(element.locator().clone()));
        let resumed = iter.next().unwrap().expect("resumed element");
        assert_eq!(resumed.locator().text.before, element.locator().text.before);
        assert_eq!(&resumed, element);
    }
}

#[test]
fn test_resuming_from_ids_and_classes_needing_escapes() {
    let html = concat!(
        "<html><body>",
        "<p>zero</p>",
        "<div id=\"README.md\"><p>one</p></div>",
        "<p id=\"1st\">two</p>",
        "<p class=\"x.y\">three</p>",
        "<p class=\"x\">four</p>",
        "<p class=\"a:b [c]\">five</p>",
        "</body></html>",
    );
    let elements = iterator(html, None).collect_remaining().unwrap();
    assert_eq!(
        highlights(&elements),
        ["zero", "one", "two", "three", "four", "five"]
    );
    assert!(selectors(&elements).contains(&r"#\31 st".to_string()));
    assert!(selectors(&elements).contains(&r"#README\.md > p".to_string()));

    for element in &elements {
        let mut iter = iterator(html, Some(element.locator().clone()));
        let resumed = iter.next().unwrap().expect("resumed element");
        assert_eq!(&resumed, element);
    }
}
