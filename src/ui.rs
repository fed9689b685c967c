// Terminal UI utilities
// Status lines, diagram printing and the header/code diagram diff.

use colored::Colorize;

use crate::services::FieldDrift;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

/// Print a rendered diagram under a bold title, indented by three spaces
pub fn print_diagram(title: &str, diagram: &str) {
    println!("{}", title.bold());
    for line in diagram.lines() {
        println!("   {}", line);
    }
    println!();
}

/// One line of a diagram diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Same(&'a str),
    HeaderOnly(&'a str),
    CodeOnly(&'a str),
}

/// Line diff of two diagrams based on their longest common subsequence
pub fn diff_lines<'a>(header: &'a str, code: &'a str) -> Vec<DiffLine<'a>> {
    let a: Vec<&str> = header.lines().collect();
    let b: Vec<&str> = code.lines().collect();

    // lcs[i][j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    let mut out = Vec::with_capacity(a.len().max(b.len()));
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            out.push(DiffLine::Same(a[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(DiffLine::HeaderOnly(a[i]));
            i += 1;
        } else {
            out.push(DiffLine::CodeOnly(b[j]));
            j += 1;
        }
    }
    out.extend(a[i..].iter().copied().map(DiffLine::HeaderOnly));
    out.extend(b[j..].iter().copied().map(DiffLine::CodeOnly));
    out
}

/// Print the diff with `-` for header-only and `+` for code-only lines
pub fn print_diff(header: &str, code: &str) {
    println!("{}", "Diff (- header, + code):".bold());
    for line in diff_lines(header, code) {
        match line {
            DiffLine::Same(l) => println!("     {}", l),
            DiffLine::HeaderOnly(l) => println!("   {}", format!("- {}", l).red()),
            DiffLine::CodeOnly(l) => println!("   {}", format!("+ {}", l).green()),
        }
    }
    println!();
}

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<root>")
}

/// Print per-file header/code disagreements
pub fn print_drift(drift: &[FieldDrift]) {
    if drift.is_empty() {
        return;
    }
    println!("{}", "Drifting fields:".bold());
    for d in drift {
        println!(
            "   {} {}: header={} code={}",
            d.file.yellow(),
            d.field,
            show(&d.header),
            show(&d.code)
        );
    }
    println!();
}
