use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn phase(name: &str) {
    println!();
    println!(
        "{} {}",
        Icons::GEAR.style(theme().info.clone()),
        name.style(theme().header.clone())
    );
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK.style(theme().dim.clone()), elapsed);
}

pub fn artifact(path: &Path) {
    println!("  {} {}", Icons::FILE, muted(&path.display().to_string()));
}

/// Render a cycle as `a → b → a`
pub fn format_cycle(cycle: &[String]) -> String {
    let arrow = format!(" {} ", "→".style(theme().dim.clone()));
    cycle
        .iter()
        .map(|node| node.style(theme().cycle.clone()).to_string())
        .collect::<Vec<_>>()
        .join(&arrow)
}

pub fn cycle(index: usize, cycle: &[String]) {
    println!("  {} {:>3}. {}", Icons::CYCLE, index + 1, format_cycle(cycle));
}
