use crate::EnvironmentError;

const WORD_BITS: usize = u64::BITS as usize;

/// Character marking an impassable cell in [`Environment::from_rows`].
pub const IMPASSABLE_CHAR: char = '#';

/// Immutable passability field the agents drive on.
///
/// The field covers integer coordinates `[0, width) × [0, height)`. Each point is either
/// passable or impassable; the classification is packed one bit per point, row-major.
///
/// Anything outside the field is impassable. Sensor rays and corner checks routinely
/// probe past the edges, and this rule is what stops them.
///
/// # Examples
///
/// ```
/// use oxidrive_engine::Environment;
///
/// let env = Environment::from_rows(["#####", "#...#", "#####"]).unwrap();
/// assert!(!env.is_impassable(2, 1));
/// assert!(env.is_impassable(0, 0));
/// assert!(env.is_impassable(-1, 1));
/// assert!(env.is_impassable(5, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    width: usize,
    height: usize,
    impassable: Vec<u64>,
}

impl Environment {
    /// Builds an environment by classifying every point with `is_impassable(x, y)`.
    pub fn from_fn<F>(
        width: usize,
        height: usize,
        mut is_impassable: F,
    ) -> Result<Self, EnvironmentError>
    where
        F: FnMut(usize, usize) -> bool,
    {
        if width == 0 || height == 0 {
            return Err(EnvironmentError::Empty { width, height });
        }
        let mut impassable = vec![0; (width * height).div_ceil(WORD_BITS)];
        for y in 0..height {
            for x in 0..width {
                if is_impassable(x, y) {
                    let index = y * width + x;
                    impassable[index / WORD_BITS] |= 1 << (index % WORD_BITS);
                }
            }
        }
        Ok(Self {
            width,
            height,
            impassable,
        })
    }

    /// Builds an environment in which every point is passable.
    pub fn passable(width: usize, height: usize) -> Result<Self, EnvironmentError> {
        Self::from_fn(width, height, |_, _| false)
    }

    /// Parses an ASCII picture, one string per row.
    ///
    /// [`IMPASSABLE_CHAR`] (`#`) marks impassable points; any other character is passable.
    /// All rows must have the same number of characters.
    pub fn from_rows<I, S>(rows: I) -> Result<Self, EnvironmentError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.as_ref()
                    .chars()
                    .map(|c| c == IMPASSABLE_CHAR)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(EnvironmentError::RaggedRow {
                row,
                expected: width,
                actual: cells.len(),
            });
        }
        Self::from_fn(width, rows.len(), |x, y| rows[y][x])
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns whether the point blocks agents and sensor rays.
    ///
    /// Out-of-bounds points (including negative coordinates) are impassable.
    #[must_use]
    pub fn is_impassable(&self, x: i64, y: i64) -> bool {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return true;
        };
        if x >= self.width || y >= self.height {
            return true;
        }
        self.is_impassable_unchecked(x, y)
    }

    /// Iterates over impassable points on a grid of the given stride.
    ///
    /// Used by renderers that cannot draw every point of a large field.
    pub fn impassable_points(&self, stride: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let stride = stride.max(1);
        (0..self.height).step_by(stride).flat_map(move |y| {
            (0..self.width)
                .step_by(stride)
                .filter(move |&x| self.is_impassable_unchecked(x, y))
                .map(move |x| (x, y))
        })
    }

    fn is_impassable_unchecked(&self, x: usize, y: usize) -> bool {
        let index = y * self.width + x;
        self.impassable[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }
}
