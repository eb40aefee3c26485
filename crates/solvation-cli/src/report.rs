use solvation::analysis::coordination::Coordination;
use solvation::analysis::networking::Networking;
use solvation::analysis::pairing::Pairing;
use solvation::analysis::residence::Residence;
use solvation::analysis::speciation::Speciation;
use solvation::workflows::solution::Solution;
use std::collections::BTreeMap;
use std::fmt;

/// Number of shell compositions listed in the speciation table.
const TOP_SHELLS: usize = 10;

/// A titled, column-aligned text table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: &str, headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain([header.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{:>w$}", cell, w = w))
        .collect();
    writeln!(f, "  {}", padded.join("  "))
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        writeln!(f, "{}", self.title)?;
        write_line(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        write_line(f, &rule, &widths)?;
        for row in &self.rows {
            write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

fn fmt_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.3}", value)
    }
}

pub fn speciation_table(speciation: &Speciation) -> Table {
    let names = speciation.solvent_names();
    let mut table = Table::new(
        "Speciation (most frequent shells)",
        names
            .iter()
            .map(String::as_str)
            .chain(["count", "fraction"]),
    );
    for shell in speciation.shell_fractions().iter().take(TOP_SHELLS) {
        let mut row: Vec<String> = names
            .iter()
            .map(|n| shell.composition.get(n).copied().unwrap_or(0).to_string())
            .collect();
        row.push(shell.count.to_string());
        row.push(fmt_value(shell.fraction));
        table.push_row(row);
    }
    table
}

pub fn co_occurrence_table(speciation: &Speciation) -> Table {
    let names = speciation.solvent_names();
    let matrix = speciation.co_occurrence_matrix();
    let mut table = Table::new(
        "Co-occurrence (rows: given, columns: found)",
        std::iter::once("").chain(names.iter().map(String::as_str)),
    );
    for (i, given) in names.iter().enumerate() {
        let mut row = vec![given.clone()];
        row.extend((0..names.len()).map(|j| fmt_value(matrix[(i, j)])));
        table.push_row(row);
    }
    table
}

fn per_solvent_table(title: &str, column: &str, values: &BTreeMap<String, f64>) -> Table {
    let mut table = Table::new(title, ["solvent", column]);
    for (name, &value) in values {
        table.push_row(vec![name.clone(), fmt_value(value)]);
    }
    table
}

pub fn coordination_table(coordination: &Coordination) -> Table {
    per_solvent_table(
        "Coordination numbers",
        "coordination",
        coordination.coordination_numbers(),
    )
}

pub fn coordinating_atoms_table(coordination: &Coordination) -> Table {
    let mut table = Table::new("Coordinating atom types", ["solvent", "atom type", "fraction"]);
    for atom in coordination.coordinating_atoms() {
        table.push_row(vec![
            atom.res_name.clone(),
            atom.atom_type.clone(),
            fmt_value(atom.fraction),
        ]);
    }
    table
}

pub fn pairing_table(pairing: &Pairing) -> Table {
    let mut table = Table::new("Pairing", ["solvent", "paired", "free", "diluent"]);
    for (name, &paired) in pairing.pairing() {
        let lookup = |m: &BTreeMap<String, f64>| fmt_value(m.get(name).copied().unwrap_or(f64::NAN));
        table.push_row(vec![
            name.clone(),
            fmt_value(paired),
            lookup(pairing.free_solvent()),
            lookup(pairing.diluent_composition()),
        ]);
    }
    table
}

pub fn residence_table(residence: &Residence) -> Table {
    let mut table = Table::new("Residence times", ["solvent", "cutoff", "fit"]);
    for (name, &cutoff) in residence.residence_times() {
        let fit = residence
            .residence_times_fit()
            .get(name)
            .copied()
            .unwrap_or(f64::NAN);
        table.push_row(vec![name.clone(), fmt_value(cutoff), fmt_value(fit)]);
    }
    table
}

pub fn solute_status_table(networking: &Networking) -> Table {
    let status = networking.solute_status();
    let mut table = Table::new(
        &format!("Solute status (networks through {})", networking.solvents().join(", ")),
        ["alone", "paired", "in network"],
    );
    table.push_row(vec![
        fmt_value(status.alone),
        fmt_value(status.paired),
        fmt_value(status.in_network),
    ]);
    table
}

/// Network sizes summed over all frames.
pub fn network_sizes_table(networking: &Networking) -> Table {
    let mut totals: BTreeMap<usize, usize> = BTreeMap::new();
    for sizes in networking.network_sizes().values() {
        for (&size, &count) in sizes {
            *totals.entry(size).or_insert(0) += count;
        }
    }
    let mut table = Table::new("Network sizes (all frames)", ["size", "networks"]);
    for (size, count) in totals {
        table.push_row(vec![size.to_string(), count.to_string()]);
    }
    table
}

/// Tables for every analysis available on `solution`.
pub fn solution_tables(solution: &Solution) -> Vec<Table> {
    let mut tables = Vec::new();
    if let Some(s) = solution.speciation() {
        tables.push(speciation_table(s));
        tables.push(co_occurrence_table(s));
    }
    if let Some(c) = solution.coordination() {
        tables.push(coordination_table(c));
        tables.push(coordinating_atoms_table(c));
    }
    if let Some(p) = solution.pairing() {
        tables.push(pairing_table(p));
    }
    if let Some(r) = solution.residence() {
        tables.push(residence_table(r));
    }
    if let Some(n) = solution.networking() {
        tables.push(solute_status_table(n));
        tables.push(network_sizes_table(n));
    }
    tables
}
