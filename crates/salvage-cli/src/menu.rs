use crate::render;
use colored::*;
use salvage_core::analysis::{build_conflict_groups, build_presence_table, ConflictGroup, PresenceRow};
use salvage_core::scanner::join_relative;
use salvage_core::transfer::{copy_between_locations, location_paths};
use salvage_core::{scan_locations, AppConfig, FileFilter, Inventory, SilentReporter};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;
use tracing::{error, info};

const MENU: &str = "\
1. Show all files
2. Show conflicts
3. Compare a file between locations
4. Bulk compare critical files
5. Copy a file between locations
6. Open a file in editor
7. Exit";

/// Numbered menu over an inventory of the configured locations.
/// Reads choices from `input` until `7` or end of input.
pub struct Menu<'a, R, W> {
    config: &'a AppConfig,
    filter: FileFilter,
    input: R,
    output: W,
    rows: Vec<PresenceRow>,
    conflicts: Vec<ConflictGroup>,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(config: &'a AppConfig, input: R, output: W) -> Self {
        let filter = FileFilter::new(config.extension_filter(), &config.ignore_patterns);
        let mut menu = Self {
            config,
            filter,
            input,
            output,
            rows: Vec::new(),
            conflicts: Vec::new(),
        };
        menu.refresh();
        menu
    }

    fn refresh(&mut self) {
        let inventory: Inventory =
            scan_locations(&self.config.locations, &self.filter, &SilentReporter);
        self.rows = build_presence_table(&self.config.locations, &inventory);
        self.conflicts = build_conflict_groups(&inventory.records);
        info!(
            "Inventory refreshed: {} paths, {} conflicts",
            self.rows.len(),
            self.conflicts.len()
        );
    }

    /// `None` once the input is exhausted.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_confirm(&mut self, label: &str) -> io::Result<bool> {
        loop {
            match self.prompt(&format!("{} (y/N): ", label))? {
                None => return Ok(false),
                Some(answer) => match answer.to_uppercase().as_str() {
                    "Y" => return Ok(true),
                    "N" | "" => return Ok(false),
                    _ => continue,
                },
            }
        }
    }

    /// Accepts a row number from the file table or a relative path.
    fn prompt_path(&mut self) -> io::Result<Option<String>> {
        let Some(answer) = self.prompt("File (# or relative path): ")? else {
            return Ok(None);
        };
        if let Ok(n) = answer.parse::<usize>() {
            return match n.checked_sub(1).and_then(|i| self.rows.get(i)) {
                Some(row) => Ok(Some(row.relative_path.clone())),
                None => {
                    writeln!(self.output, "{}", format!("No file #{}", n).red())?;
                    Ok(None)
                }
            };
        }
        Ok(Some(answer).filter(|a| !a.is_empty()))
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "{}", MENU)?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                writeln!(self.output)?;
                return Ok(());
            };
            match choice.as_str() {
                "1" => self.show_files()?,
                "2" => self.show_conflicts()?,
                "3" => self.compare_file()?,
                "4" => self.compare_critical_files()?,
                "5" => self.copy_file()?,
                "6" => self.open_in_editor()?,
                "7" => return Ok(()),
                other => writeln!(self.output, "{}", format!("Invalid option: {}", other).red())?,
            }
        }
    }

    fn show_files(&mut self) -> io::Result<()> {
        if self.rows.is_empty() {
            return writeln!(self.output, "No files found.");
        }
        render::presence_table(&mut self.output, &self.config.locations, &self.rows, None)
    }

    fn show_conflicts(&mut self) -> io::Result<()> {
        if self.conflicts.is_empty() {
            return writeln!(self.output, "{}", "No path conflicts.".green());
        }
        for (i, conflict) in self.conflicts.iter().enumerate() {
            writeln!(
                self.output,
                "{:>3}. {}: {}",
                i + 1,
                conflict.relative_path.yellow(),
                conflict.summary()
            )?;
        }
        Ok(())
    }

    fn choose_location(&mut self, label: &str, names: &[String]) -> io::Result<Option<String>> {
        writeln!(self.output, "Locations: {}", names.join(", "))?;
        let Some(name) = self.prompt(label)? else {
            return Ok(None);
        };
        if names.contains(&name) {
            Ok(Some(name))
        } else {
            writeln!(self.output, "{}", format!("Unknown location: {}", name).red())?;
            Ok(None)
        }
    }

    fn compare_file(&mut self) -> io::Result<()> {
        let Some(relative_path) = self.prompt_path()? else {
            return Ok(());
        };
        let holders = location_paths(&self.config.locations, &relative_path);
        if holders.len() < 2 {
            return writeln!(
                self.output,
                "{} is present in {} location(s); nothing to compare.",
                relative_path,
                holders.len()
            );
        }
        let names: Vec<String> = holders.iter().map(|(name, _)| name.clone()).collect();
        let Some(left) = self.choose_location("First location: ", &names)? else {
            return Ok(());
        };
        let Some(right) = self.choose_location("Second location: ", &names)? else {
            return Ok(());
        };
        self.diff_between(&relative_path, &left, &right)
    }

    /// Diff `relative_path` as held by two named locations.
    fn diff_between(&mut self, relative_path: &str, left: &str, right: &str) -> io::Result<()> {
        let holders = location_paths(&self.config.locations, relative_path);
        let path_of = |name: &str| {
            holders
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, p)| p.as_path())
        };
        let (Some(left), Some(right)) = (path_of(left), path_of(right)) else {
            return writeln!(self.output, "Not enough files to compare for {}", relative_path);
        };
        writeln!(self.output, "Comparing: {} and {}", left.display(), right.display())?;
        self.output.flush()?;
        if let Err(err) = run_tool(&self.config.diff_tool, &[left, right]) {
            error!("Diff failed: {}", err);
            writeln!(self.output, "{}", format!("Diff failed: {}", err).red())?;
        }
        Ok(())
    }

    /// Inventoried paths a critical file refers to. Entries holding a `/` are
    /// relative paths; bare names match every path ending in that file name.
    fn critical_paths(&self, critical: &str) -> Vec<String> {
        if critical.contains('/') {
            return vec![critical.to_string()];
        }
        self.rows
            .iter()
            .map(|row| &row.relative_path)
            .filter(|path| path.rsplit('/').next() == Some(critical))
            .cloned()
            .collect()
    }

    fn compare_critical_files(&mut self) -> io::Result<()> {
        let config = self.config;
        let critical_files = &config.recover.critical_files;
        if critical_files.is_empty() {
            return writeln!(self.output, "No critical files configured.");
        }
        for (i, name) in critical_files.iter().enumerate() {
            writeln!(self.output, "{:>3}. {}", i + 1, name)?;
        }
        let Some(answer) = self.prompt("File # (0 for all): ")? else {
            return Ok(());
        };
        let selected: Vec<String> = match answer.parse::<usize>() {
            Ok(0) => critical_files.clone(),
            Ok(n) if n <= critical_files.len() => vec![critical_files[n - 1].clone()],
            _ => {
                return writeln!(self.output, "{}", format!("Invalid file number: {}", answer).red())
            }
        };

        let names: Vec<String> = config.locations.iter().map(|l| l.name.clone()).collect();
        let Some(left) = self.choose_location("First location: ", &names)? else {
            return Ok(());
        };
        let Some(right) = self.choose_location("Second location: ", &names)? else {
            return Ok(());
        };

        for critical in selected {
            let paths = self.critical_paths(&critical);
            if paths.is_empty() {
                writeln!(self.output, "{} is not present in any location.", critical)?;
            }
            for relative_path in paths {
                self.diff_between(&relative_path, &left, &right)?;
            }
        }
        Ok(())
    }

    fn open_in_editor(&mut self) -> io::Result<()> {
        let Some(relative_path) = self.prompt_path()? else {
            return Ok(());
        };
        let holders = location_paths(&self.config.locations, &relative_path);
        if holders.is_empty() {
            return writeln!(self.output, "{} is not present in any location.", relative_path);
        }
        let names: Vec<String> = holders.iter().map(|(name, _)| name.clone()).collect();
        let Some(name) = self.choose_location("Open from: ", &names)? else {
            return Ok(());
        };
        if let Some((_, path)) = holders.iter().find(|(n, _)| *n == name) {
            writeln!(self.output, "Opening {}", path.display())?;
            self.output.flush()?;
            if let Err(err) = run_tool(&self.config.editor, &[path.as_path()]) {
                error!("Editor failed: {}", err);
                writeln!(self.output, "{}", format!("Editor failed: {}", err).red())?;
            }
        }
        Ok(())
    }

    fn copy_file(&mut self) -> io::Result<()> {
        let Some(relative_path) = self.prompt_path()? else {
            return Ok(());
        };
        let holders = location_paths(&self.config.locations, &relative_path);
        if holders.is_empty() {
            return writeln!(self.output, "{} is not present in any location.", relative_path);
        }
        let sources: Vec<String> = holders.into_iter().map(|(name, _)| name).collect();
        let Some(from) = self.choose_location("Copy from: ", &sources)? else {
            return Ok(());
        };
        let targets: Vec<String> = self
            .config
            .locations
            .iter()
            .map(|l| l.name.clone())
            .filter(|name| *name != from)
            .collect();
        let Some(to) = self.choose_location("Copy to: ", &targets)? else {
            return Ok(());
        };
        let config = self.config;
        if let Ok(location) = config.location(&to) {
            if join_relative(&location.path, &relative_path).exists()
                && !self.prompt_confirm(&format!("Overwrite {} in {}?", relative_path, to))?
            {
                return writeln!(self.output, "Copy cancelled.");
            }
        }

        match copy_between_locations(&config.locations, &relative_path, &from, &to) {
            Ok(path) => {
                writeln!(
                    self.output,
                    "{} {} -> {}",
                    "Copied".green(),
                    relative_path,
                    path.display()
                )?;
                self.refresh();
            }
            Err(err) => {
                error!("Copy failed: {}", err);
                writeln!(self.output, "{}", format!("Copy failed: {}", err).red())?;
            }
        }
        Ok(())
    }
}

/// Run an external command with `paths` appended and wait for it. The tool's
/// own exit status (1 for "files differ") is not an error.
fn run_tool(command: &[String], paths: &[&Path]) -> io::Result<()> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    Command::new(program)
        .args(args)
        .args(paths)
        .status()
        .map(|_| ())
}
