use csv::WriterBuilder;
use std::io::{self, Write};

/// Dense, gap-free table of per-bucket category values.
///
/// Row `i` holds the values recorded for bucket `i`. The table only ever
/// grows: rows are appended zero-initialised and are never removed or
/// reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTable<const N: usize> {
    rows: Vec<[u64; N]>,
}

impl<const N: usize> Default for BucketTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BucketTable<N> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[[u64; N]] {
        &self.rows
    }

    pub fn row(&self, bucket: usize) -> Option<&[u64; N]> {
        self.rows.get(bucket)
    }

    /// Add `amount` to `category` in `bucket`, growing the table with zero
    /// rows until `bucket` exists. Cells saturate at `u64::MAX`.
    ///
    /// # Panics
    ///
    /// Panics if `category >= N`.
    pub fn record(&mut self, bucket: usize, category: usize, amount: u64) {
        assert!(
            category < N,
            "category {category} out of range for a {N}-column table"
        );
        if bucket >= self.rows.len() {
            self.rows.resize(bucket + 1, [0; N]);
        }
        let cell = &mut self.rows[bucket][category];
        *cell = cell.saturating_add(amount);
    }

    pub fn record_one(&mut self, bucket: usize, category: usize) {
        self.record(bucket, category, 1);
    }

    /// Walk the table in bucket order, pairing each row with the running
    /// per-category totals up to and including it.
    pub fn cumulative(&self) -> CumulativeRows<'_, N> {
        CumulativeRows {
            rows: self.rows.iter().enumerate(),
            totals: [0; N],
        }
    }

    /// Final per-category totals over the whole table.
    pub fn totals(&self) -> [u64; N] {
        self.cumulative().last().map(|row| row.totals).unwrap_or([0; N])
    }

    /// One line per bucket: index, the N values, then the N running totals.
    pub fn write_csv<W: Write>(&self, out: W) -> io::Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
        for row in self.cumulative() {
            writer.write_record(row.fields())?;
        }
        writer.flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativeRow<const N: usize> {
    pub index: usize,
    pub values: [u64; N],
    pub totals: [u64; N],
}

impl<const N: usize> CumulativeRow<N> {
    /// Index, the N values, then the N running totals.
    pub fn fields(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.index.to_string()).chain(
            self.values
                .iter()
                .chain(self.totals.iter())
                .map(u64::to_string),
        )
    }
}

pub struct CumulativeRows<'a, const N: usize> {
    rows: std::iter::Enumerate<std::slice::Iter<'a, [u64; N]>>,
    totals: [u64; N],
}

impl<const N: usize> Iterator for CumulativeRows<'_, N> {
    type Item = CumulativeRow<N>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, values) = self.rows.next()?;
        for (total, value) in self.totals.iter_mut().zip(values) {
            *total = total.saturating_add(*value);
        }
        Some(CumulativeRow {
            index,
            values: *values,
            totals: self.totals,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::BucketTable;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    #[test]
    fn grows_to_highest_bucket_with_zero_rows() {
        let mut table = BucketTable::<4>::new();
        table.record_one(3, 1);
        table.record_one(1, 0);

        assert_eq!(table.len(), 4);
        assert_eq!(table.row(0), Some(&[0, 0, 0, 0]));
        assert_eq!(table.row(1), Some(&[1, 0, 0, 0]));
        assert_eq!(table.row(2), Some(&[0, 0, 0, 0]));
        assert_eq!(table.row(3), Some(&[0, 1, 0, 0]));
    }

    #[test]
    fn lower_bucket_never_shrinks_table() {
        let mut table = BucketTable::<2>::new();
        table.record(9, 0, 5);
        let before = table.len();
        table.record(0, 1, 2);
        assert_eq!(table.len(), before);
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn amounts_accumulate_within_bucket() {
        let mut table = BucketTable::<4>::new();
        table.record(0, 3, 4);
        table.record_one(0, 3);
        assert_eq!(table.row(0), Some(&[0, 0, 0, 5]));
    }

    #[test]
    fn cells_saturate_instead_of_wrapping() {
        let mut table = BucketTable::<1>::new();
        table.record(0, 0, u64::MAX - 1);
        table.record(0, 0, 5);
        table.record(1, 0, 3);

        assert_eq!(table.row(0), Some(&[u64::MAX]));
        assert_eq!(table.totals(), [u64::MAX]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn rejects_unknown_category() {
        let mut table = BucketTable::<2>::new();
        table.record_one(0, 2);
    }

    #[test]
    fn recording_order_does_not_matter() {
        let triples: Vec<(usize, usize, u64)> = (0..200)
            .map(|i| ((i * 7) % 23, i % 4, (i % 5) as u64 + 1))
            .collect();

        let mut expected = BucketTable::<4>::new();
        for &(bucket, category, amount) in &triples {
            expected.record(bucket, category, amount);
        }

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..5 {
            let mut shuffled = triples.clone();
            shuffled.shuffle(&mut rng);

            let mut table = BucketTable::<4>::new();
            for (bucket, category, amount) in shuffled {
                table.record(bucket, category, amount);
            }
            assert_eq!(table, expected);
        }
    }

    #[test]
    fn cumulative_totals_never_decrease() {
        let mut table = BucketTable::<3>::new();
        table.record(0, 0, 3);
        table.record(2, 1, 1);
        table.record(4, 2, 7);
        table.record(4, 0, 2);

        let rows: Vec<_> = table.cumulative().collect();
        assert_eq!(rows.len(), 5);
        for pair in rows.windows(2) {
            for j in 0..3 {
                assert!(pair[0].totals[j] <= pair[1].totals[j]);
            }
        }
        assert_eq!(table.totals(), [5, 1, 7]);
    }

    #[test]
    fn csv_lists_index_values_then_totals() {
        let mut table = BucketTable::<4>::new();
        table.record_one(1, 0);
        table.record_one(1, 1);
        table.record_one(2, 0);

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0,0,0,0,0,0,0,0,0\n1,1,1,0,0,1,1,0,0\n2,1,0,0,0,2,1,0,0\n"
        );
    }

    #[test]
    fn empty_table_writes_nothing() {
        let table = BucketTable::<4>::new();
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(table.totals(), [0; 4]);
    }
}
