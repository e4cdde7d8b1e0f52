use foam_analysis::semantic_tokens::{collect_semantic_tokens, TokenCategory};
use foam_analysis::text::split_lines;
use foam_analysis::validate_braces;

fn main() {
    // Read from file if provided, otherwise use inline source
    let source = if let Some(path) = std::env::args().nth(1) {
        std::fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("Failed to read {path}: {err}");
            std::process::exit(1);
        })
    } else {
        r#"/*--------------------------------*- C++ -*----------------------------------*\
  =========                 |
  \\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox
\*---------------------------------------------------------------------------*/
FoamFile
{
    format      ascii;
    class       volVectorField;
    object      U;
}

dimensions      [0 1 -1 0 0 0 0];

internalField   uniform (0 0 0);

boundaryField
{
    movingWall
    {
        type            fixedValue;
        value           uniform (1 0 0);
    }
    frontAndBack
    {
        type            empty;
    }
}
"#
        .to_string()
    };

    let lines: Vec<&str> = split_lines(&source).collect();
    let tokens = collect_semantic_tokens(&source);

    println!("Found {} semantic tokens:\n", tokens.len());

    for token in &tokens {
        let line = lines[token.line as usize];
        let units: Vec<u16> = line
            .encode_utf16()
            .skip(token.start as usize)
            .take(token.length as usize)
            .collect();
        let snippet = String::from_utf16_lossy(&units);
        let preview = if snippet.chars().count() > 50 {
            format!("{}...", snippet.chars().take(50).collect::<String>())
        } else {
            snippet
        };

        println!(
            "{:>4}:{:<4} {:10} | {:?}",
            token.line,
            token.start,
            token.category.as_str(),
            preview
        );
    }

    // Group by category
    println!("\n\nGrouped by category:");
    println!("====================\n");

    let mut by_category: std::collections::BTreeMap<&str, usize> =
        std::collections::BTreeMap::new();
    for token in &tokens {
        *by_category.entry(token.category.as_str()).or_insert(0) += 1;
    }
    for (category, count) in by_category {
        println!("{category:10} {count}");
    }

    let comments = tokens
        .iter()
        .filter(|token| token.category == TokenCategory::Comment)
        .count();
    println!("\n{comments} comment line(s)");

    println!("\nBrace diagnostics:");
    let diagnostics = validate_braces(&source);
    if diagnostics.is_empty() {
        println!("  none");
    }
    for diagnostic in diagnostics {
        println!("  line {}: {}", diagnostic.range.line, diagnostic.message());
    }
}
