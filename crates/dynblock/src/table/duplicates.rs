use super::LookupTable;
use std::collections::HashMap;
use tracing::debug;

/// Column excluded from duplicate detection unless configured otherwise.
pub const DEFAULT_IDENTITY_COLUMN: &str = "ID";

impl LookupTable {
    /// Groups of row indices that agree on every column except `ID`.
    pub fn find_duplicate_groups(&self) -> Vec<Vec<usize>> {
        self.find_duplicate_groups_excluding(DEFAULT_IDENTITY_COLUMN)
    }

    /// Groups of row indices that agree on every column whose name is not
    /// `identity` (compared case-insensitively). When no column has that name
    /// all columns participate. Each group has at least two rows, indices are
    /// ascending and groups are ordered by their first row.
    pub fn find_duplicate_groups_excluding(&self, identity: &str) -> Vec<Vec<usize>> {
        let compared: Vec<&str> = self
            .column_names()
            .filter(|name| !name.eq_ignore_ascii_case(identity))
            .collect();

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut by_key: HashMap<Vec<Option<String>>, usize> = HashMap::new();
        for (index, row) in self.rows.iter().enumerate() {
            // Type-tagged so Text("1") and Number(1) never collide.
            let key: Vec<Option<String>> = compared
                .iter()
                .map(|name| {
                    row.get(*name)
                        .map(|v| format!("{}:{}", v.column_type(), v))
                })
                .collect();
            match by_key.get(&key) {
                Some(&group) => groups[group].push(index),
                None => {
                    by_key.insert(key, groups.len());
                    groups.push(vec![index]);
                }
            }
        }

        groups.retain(|g| g.len() > 1);
        groups
    }

    /// Keep the first row of every duplicate group and delete the rest.
    /// Returns the number of rows removed.
    pub fn optimize(&mut self) -> usize {
        self.optimize_excluding(DEFAULT_IDENTITY_COLUMN)
    }

    pub fn optimize_excluding(&mut self, identity: &str) -> usize {
        let mut doomed: Vec<usize> = self
            .find_duplicate_groups_excluding(identity)
            .into_iter()
            .flat_map(|group| group.into_iter().skip(1))
            .collect();
        doomed.sort_unstable();

        let before = self.rows.len();
        let mut index = 0;
        self.rows.retain(|_| {
            let keep = doomed.binary_search(&index).is_err();
            index += 1;
            keep
        });
        let removed = before - self.rows.len();
        debug!(table = %self.table_name, removed, "optimized lookup table");
        removed
    }
}

#[cfg(test)]
mod tests {
    use crate::table::{ColumnDef, ColumnType, LookupTable};

    fn table(with_id: bool) -> LookupTable {
        let mut table = LookupTable::new("T");
        if with_id {
            table
                .add_column(ColumnDef::new("ID", ColumnType::Number))
                .unwrap();
        }
        table
            .add_column(ColumnDef::new("Input", ColumnType::Text))
            .unwrap();
        table
            .add_column(ColumnDef::new("Result", ColumnType::Text))
            .unwrap();
        table
    }

    fn fill(table: &mut LookupTable, rows: &[(&str, &str, &str)]) {
        for (id, input, result) in rows {
            let mut values = vec![("Input", *input), ("Result", *result)];
            if table.column("ID").is_some() {
                values.push(("ID", *id));
            }
            table.add_text_row(values).unwrap();
        }
    }

    #[test]
    fn identity_column_is_ignored() {
        let mut t = table(true);
        fill(
            &mut t,
            &[("1", "A", "x"), ("2", "B", "y"), ("3", "A", "x"), ("4", "A", "x")],
        );
        assert_eq!(t.find_duplicate_groups(), vec![vec![0, 2, 3]]);
    }

    #[test]
    fn without_identity_column_every_column_participates() {
        let mut t = table(false);
        fill(&mut t, &[("", "A", "x"), ("", "A", "y"), ("", "A", "x")]);
        assert_eq!(t.find_duplicate_groups(), vec![vec![0, 2]]);
    }

    #[test]
    fn identity_match_is_case_insensitive() {
        let mut t = LookupTable::new("T");
        t.add_column(ColumnDef::new("Id", ColumnType::Number)).unwrap();
        t.add_column(ColumnDef::new("Input", ColumnType::Text)).unwrap();
        t.add_text_row([("Id", "1"), ("Input", "A")]).unwrap();
        t.add_text_row([("Id", "2"), ("Input", "A")]).unwrap();
        assert_eq!(t.find_duplicate_groups(), vec![vec![0, 1]]);
        assert!(t.find_duplicate_groups_excluding("Key").is_empty());
    }

    #[test]
    fn blank_cells_compare_equal() {
        let mut t = table(false);
        t.add_text_row([("Input", "A")]).unwrap();
        t.add_text_row([("Input", "A")]).unwrap();
        assert_eq!(t.find_duplicate_groups(), vec![vec![0, 1]]);
    }

    #[test]
    fn optimize_keeps_first_of_each_group() {
        let mut t = table(true);
        fill(
            &mut t,
            &[
                ("1", "A", "x"),
                ("2", "B", "y"),
                ("3", "A", "x"),
                ("4", "B", "y"),
                ("5", "C", "z"),
            ],
        );
        assert_eq!(t.optimize(), 2);
        let ids: Vec<_> = t.rows().iter().map(|r| r["ID"].to_string()).collect();
        assert_eq!(ids, ["1", "2", "5"]);
        assert_eq!(t.optimize(), 0);
    }
}
