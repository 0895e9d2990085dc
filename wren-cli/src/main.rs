//! Wren CLI - HTML parsing and debugging tool
//!
//! Usage:
//!   wren <file>                     Parse a file and print the DOM tree
//!   wren <file> --json              Print the DOM as JSON
//!   wren <file> --tokens            Show HTML tokens before the tree
//!   wren <file> --diagnostics       Show recorded parse errors
//!   wren --html '<h1>Hello</h1>'    Parse a string instead of a file
//!   wren -f tbody --html '<tr><td>1'

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{Map, Value, json};
use wren_common::warning::{clear_warnings, warn_once};
use wren_dom::{DomTree, Namespace, NodeData, NodeId};
use wren_html::{Document, DocumentMetadata, FragmentContext, HTMLTokenizer, ParseOptions};

/// UTF-8 byte order mark.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Wren - inspect how an HTML document or fragment is parsed
#[derive(Parser, Debug)]
#[command(name = "wren")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree for a file
    wren ./index.html

    # Parse inline HTML
    wren --html '<p>1<b>2<i>3</b>4</i>5</p>'

    # Parse a fragment as the contents of a <tbody>
    wren --fragment tbody --html '<tr><td>1</td></tr>'

    # Everything the parser recorded, as JSON
    wren --json --metadata --diagnostics ./index.html
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse HTML string directly instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Parse as a fragment inside an element with this tag name
    /// (`svg` and `math` select their namespaces)
    #[arg(short, long, value_name = "TAG")]
    fragment: Option<String>,

    /// Parse with the scripting flag disabled, so `<noscript>` holds markup
    #[arg(long)]
    no_scripting: bool,

    /// Do not record source positions on nodes
    #[arg(long)]
    no_locations: bool,

    /// Show the token stream before the tree
    #[arg(short, long, conflicts_with = "json")]
    tokens: bool,

    /// Print the tree as JSON
    #[arg(short, long)]
    json: bool,

    /// Show recorded parse errors
    #[arg(short, long)]
    diagnostics: bool,

    /// Show document metadata
    #[arg(short, long)]
    metadata: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = ParseOptions::default()
        .with_scripting_enabled(!cli.no_scripting)
        .with_record_locations(!cli.no_locations);

    let input = load_input(&cli)?;

    if cli.tokens {
        print_tokens(decode(&input)?);
    }

    let document = match cli.fragment.as_deref() {
        Some(tag) => wren_html::parse_fragment_with_options(
            decode(&input)?,
            options,
            &fragment_context(tag),
        )?,
        None => wren_html::parse_bytes(&input, options)?,
    };

    if cli.json {
        let report = Report {
            metadata: cli.metadata.then(|| MetadataReport::from(document.metadata())),
            issues: if cli.diagnostics {
                document.issues().iter().map(ToString::to_string).collect()
            } else {
                Vec::new()
            },
            nodes: top_level_nodes(&document)
                .into_iter()
                .map(|id| node_to_json(document.tree(), id))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_document(&document);
    if cli.metadata {
        print_metadata(document.metadata());
    }
    if cli.diagnostics {
        print_diagnostics(&document);
    }
    Ok(())
}

/// Read the input from `--html` or the file argument.
fn load_input(cli: &Cli) -> Result<Vec<u8>> {
    if let Some(ref html) = cli.html {
        Ok(html.clone().into_bytes())
    } else if let Some(ref path) = cli.path {
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        bail!("no input: pass a FILE or --html");
    }
}

fn decode(bytes: &[u8]) -> Result<&str> {
    let body = bytes.strip_prefix(BOM).unwrap_or(bytes);
    std::str::from_utf8(body).context("input is not valid UTF-8")
}

fn fragment_context(tag: &str) -> FragmentContext {
    let namespace = match tag {
        "svg" => Namespace::Svg,
        "math" => Namespace::MathMl,
        _ => Namespace::Html,
    };
    FragmentContext::new(tag).with_namespace(namespace)
}

/// The Document's children, or the fragment's nodes.
fn top_level_nodes(document: &Document) -> Vec<NodeId> {
    if document.is_fragment() {
        document.fragment_nodes().to_vec()
    } else {
        document.tree().children(document.root_node()).collect()
    }
}

// =============================================================================
// Text output
// =============================================================================

fn print_tokens(html: &str) {
    // The tree builder is not attached here, so raw text elements are
    // tokenized as markup.
    let tokens = HTMLTokenizer::new(html).run();
    println!("{}", format!("=== HTML Tokens ({}) ===", tokens.len()).bold());
    for (i, positioned) in tokens.iter().enumerate() {
        println!(
            "  {i:3}: {} {}",
            positioned.location.dimmed(),
            positioned.token
        );
    }
    println!();
}

fn print_document(document: &Document) {
    let tree = document.tree();
    if document.is_fragment() {
        println!(
            "{}",
            format!("=== Fragment ({} nodes) ===", document.fragment_nodes().len()).bold()
        );
        for &id in document.fragment_nodes() {
            print_tree(tree, id, 0);
        }
    } else {
        println!("{}", "=== DOM Tree ===".bold());
        print_tree(tree, document.root_node(), 0);
    }
}

/// Print a subtree, one node per line.
fn print_tree(tree: &DomTree, id: NodeId, depth: usize) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let location = tree
        .location(id)
        .map(|loc| format!(" @{loc}"))
        .unwrap_or_default();

    match &node.data {
        NodeData::Document => println!("{indent}{}", "#document".bold()),
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            let mut line = format!("<!DOCTYPE {name}");
            if !public_id.is_empty() || !system_id.is_empty() {
                line.push_str(&format!(" \"{public_id}\" \"{system_id}\""));
            }
            line.push('>');
            println!("{indent}{}{}", line.magenta(), location.dimmed());
        }
        NodeData::Element(element) => {
            let prefix = match element.namespace {
                Namespace::Html => "",
                Namespace::Svg => "svg ",
                Namespace::MathMl => "math ",
            };
            let attrs: String = tree
                .attributes(id)
                .iter()
                .map(|(name, value)| format!(" {}=\"{value}\"", name.yellow()))
                .collect();
            println!(
                "{indent}<{prefix}{}{attrs}>{}",
                tree.resolve(element.name).cyan(),
                location.dimmed()
            );
        }
        NodeData::Text(text) => {
            let display = text.replace('\n', "\\n");
            println!("{indent}\"{}\"{}", display.green(), location.dimmed());
        }
        NodeData::Comment(data) => {
            println!(
                "{indent}{}{}",
                format!("<!-- {data} -->").dimmed(),
                location.dimmed()
            );
        }
    }

    for child in tree.children(id) {
        print_tree(tree, child, depth + 1);
    }
}

fn print_metadata(meta: &DocumentMetadata) {
    let location = |loc: Option<wren_common::LineCol>| {
        loc.map_or_else(|| "-".to_string(), |loc| loc.to_string())
    };

    println!("\n{}", "=== Metadata ===".bold());
    println!("  document mode:      {}", meta.document_mode());
    println!(
        "  manufactured:       html={} head={} body={}",
        meta.manufactured_html, meta.manufactured_head, meta.manufactured_body
    );
    println!(
        "  duplicate <html>:   {} ({})",
        meta.duplicate_html_elements,
        location(meta.duplicate_html_location)
    );
    println!(
        "  duplicate <body>:   {} ({})",
        meta.duplicate_body_elements,
        location(meta.duplicate_body_location)
    );
    println!("  end of input:       {}", meta.document_end_location);
    println!("  source bytes:       {}", meta.html_src_bytes);
    println!(
        "  base:               href={:?} target={:?}",
        meta.base_url.url, meta.base_url.target
    );
    println!(
        "  canonical:          {}",
        meta.canonical_url.as_deref().unwrap_or("-")
    );
}

fn print_diagnostics(document: &Document) {
    let issues = document.issues();
    println!(
        "\n{}",
        format!("=== Parse Issues ({}) ===", issues.len()).bold()
    );
    clear_warnings();
    for issue in issues {
        let _ = warn_once("HTML", &issue.to_string());
    }
}

// =============================================================================
// JSON output
// =============================================================================

#[derive(Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<MetadataReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
    nodes: Vec<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataReport {
    document_mode: String,
    manufactured_html: bool,
    manufactured_head: bool,
    manufactured_body: bool,
    duplicate_html_elements: bool,
    duplicate_html_location: Option<String>,
    duplicate_body_elements: bool,
    duplicate_body_location: Option<String>,
    document_end_location: String,
    html_src_bytes: usize,
    base_url: String,
    base_target: String,
    canonical_url: Option<String>,
}

impl From<&DocumentMetadata> for MetadataReport {
    fn from(meta: &DocumentMetadata) -> Self {
        Self {
            document_mode: meta.document_mode().to_string(),
            manufactured_html: meta.manufactured_html,
            manufactured_head: meta.manufactured_head,
            manufactured_body: meta.manufactured_body,
            duplicate_html_elements: meta.duplicate_html_elements,
            duplicate_html_location: meta.duplicate_html_location.map(|l| l.to_string()),
            duplicate_body_elements: meta.duplicate_body_elements,
            duplicate_body_location: meta.duplicate_body_location.map(|l| l.to_string()),
            document_end_location: meta.document_end_location.to_string(),
            html_src_bytes: meta.html_src_bytes,
            base_url: meta.base_url.url.clone(),
            base_target: meta.base_url.target.clone(),
            canonical_url: meta.canonical_url.clone(),
        }
    }
}

fn node_to_json(tree: &DomTree, id: NodeId) -> Value {
    let mut obj = Map::new();
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };

    match &node.data {
        NodeData::Document => {
            let _ = obj.insert("type".to_string(), json!("document"));
        }
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            let _ = obj.insert("type".to_string(), json!("doctype"));
            let _ = obj.insert("name".to_string(), json!(name));
            let _ = obj.insert("publicId".to_string(), json!(public_id));
            let _ = obj.insert("systemId".to_string(), json!(system_id));
        }
        NodeData::Element(element) => {
            let _ = obj.insert("type".to_string(), json!("element"));
            let _ = obj.insert("tagName".to_string(), json!(tree.resolve(element.name)));
            if element.namespace != Namespace::Html {
                let _ = obj.insert("namespace".to_string(), json!(element.namespace.url()));
            }
            let attrs: Map<String, Value> = tree
                .attributes(id)
                .into_iter()
                .map(|(k, v)| (k.to_string(), json!(v)))
                .collect();
            let _ = obj.insert("attributes".to_string(), Value::Object(attrs));
        }
        NodeData::Text(text) => {
            let _ = obj.insert("type".to_string(), json!("text"));
            let _ = obj.insert("content".to_string(), json!(text));
        }
        NodeData::Comment(text) => {
            let _ = obj.insert("type".to_string(), json!("comment"));
            let _ = obj.insert("content".to_string(), json!(text));
        }
    }

    if let Some(loc) = tree.location(id) {
        let _ = obj.insert("location".to_string(), json!(loc.to_string()));
    }

    let children: Vec<Value> = tree
        .children(id)
        .map(|child| node_to_json(tree, child))
        .collect();
    if !children.is_empty() {
        let _ = obj.insert("children".to_string(), Value::Array(children));
    }

    Value::Object(obj)
}
