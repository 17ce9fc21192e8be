#![forbid(unsafe_code)]

////////////////////////////////////////////////////////////////////////////////

use std::fmt::Display;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("grid size must be positive")]
    InvalidSize,
    #[error("site ({row}, {col}) is outside the {n}x{n} grid")]
    SiteOutOfRange { row: usize, col: usize, n: usize },
}

////////////////////////////////////////////////////////////////////////////////

/// A disjoint-set forest over the fixed universe `0..len`.
///
/// Stored arena-style: a parent index per element and, meaningful only at
/// roots, a component size. `union` merges by size, `find` compresses paths,
/// so any sequence of operations runs in near-constant amortized time per
/// call. Components are only ever merged, never split.
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    /// Creates a forest of `len` singleton sets, each its own root of size 1.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    /// Returns the number of elements in the universe.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if the universe has no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the root of the set containing `x`, rewiring every node on
    /// the walked path to point directly at it.
    ///
    /// # Panics
    ///
    /// If `x` is not below `len`.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while node != root {
            node = std::mem::replace(&mut self.parent[node], root);
        }
        root
    }

    /// Merges the sets containing `x` and `y`, attaching the smaller tree
    /// beneath the larger (ties attach `y`'s root under `x`'s root).
    /// Returns `false` if they already shared a root.
    ///
    /// # Panics
    ///
    /// If `x` or `y` is not below `len`.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let mut x = self.find(x);
        let mut y = self.find(y);
        if x == y {
            return false;
        }
        if self.size[x] < self.size[y] {
            std::mem::swap(&mut x, &mut y);
        }
        self.parent[y] = x;
        self.size[x] += self.size[y];
        true
    }

    /// Returns `true` if `x` and `y` are in the same set.
    ///
    /// # Panics
    ///
    /// If `x` or `y` is not below `len`.
    pub fn connected(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }
}

////////////////////////////////////////////////////////////////////////////////

const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// An n-by-n grid of sites that open one at a time, answering "does an open
/// path connect the top row to the bottom row?" in constant time per query.
///
/// The grid is backed by a [`UnionFind`] over `n * n + 2` slots: one per
/// site in row-major order plus two virtual sentinels, one pre-wired to the
/// whole top row and one to the whole bottom row. Percolation is then a
/// single connectivity query between the sentinels, kept current by the
/// unions performed as sites open.
///
/// Public coordinates are 1-indexed: `row` and `col` range over `[1, n]`.
/// Sites only ever transition closed to open.
pub struct Percolation {
    n: usize,
    grid: Vec<bool>,
    forest: UnionFind,
    open_count: usize,
}

impl Percolation {
    /// Creates an n-by-n grid with every site blocked and both sentinels
    /// wired to their border rows.
    ///
    /// The sentinel wiring is unconditional: for `n == 1` the single site
    /// sits in both border rows, so a fresh 1x1 grid already percolates.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSize`] if `n` is zero.
    pub fn new(n: usize) -> Result<Self, Error> {
        if n == 0 {
            return Err(Error::InvalidSize);
        }
        let mut forest = UnionFind::new(n * n + 2);
        for col in 0..n {
            forest.union(n * n, col);
            forest.union(n * n + 1, n * n - 1 - col);
        }
        Ok(Self {
            n,
            grid: vec![false; n * n],
            forest,
            open_count: 0,
        })
    }

    /// Returns the side length of the grid.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Opens the site at `(row, col)` and unions it with each open
    /// orthogonal neighbor. Opening an already-open site is a no-op.
    pub fn open(&mut self, row: usize, col: usize) -> Result<(), Error> {
        let site = self.site_index(row, col)?;
        if self.grid[site] {
            return Ok(());
        }
        self.grid[site] = true;
        self.open_count += 1;

        for (dr, dc) in NEIGHBOR_OFFSETS {
            let nrow = row as isize + dr;
            let ncol = col as isize + dc;
            if nrow < 1 || nrow > self.n as isize || ncol < 1 || ncol > self.n as isize {
                continue;
            }
            let neighbor = self.site_index(nrow as usize, ncol as usize)?;
            if self.grid[neighbor] {
                self.forest.union(site, neighbor);
            }
        }
        Ok(())
    }

    /// Returns whether the site at `(row, col)` is open.
    pub fn is_open(&self, row: usize, col: usize) -> Result<bool, Error> {
        let site = self.site_index(row, col)?;
        Ok(self.grid[site])
    }

    /// Returns whether the site at `(row, col)` is full, i.e. open and
    /// reachable from the top row through open sites. Stronger than
    /// [`Percolation::percolates`], which only relates the two sentinels.
    pub fn is_full(&mut self, row: usize, col: usize) -> Result<bool, Error> {
        let site = self.site_index(row, col)?;
        if !self.grid[site] {
            return Ok(false);
        }
        let top = self.n * self.n;
        Ok(self.forest.connected(site, top))
    }

    /// Returns the number of open sites.
    pub fn number_of_open_sites(&self) -> usize {
        self.open_count
    }

    /// Returns `true` if an open path connects the top row to the bottom
    /// row. Once `true`, stays `true`: unions are never undone.
    pub fn percolates(&mut self) -> bool {
        let top = self.n * self.n;
        self.forest.connected(top, top + 1)
    }

    /// Maps 1-indexed grid coordinates to the row-major forest slot.
    fn site_index(&self, row: usize, col: usize) -> Result<usize, Error> {
        if row < 1 || row > self.n || col < 1 || col > self.n {
            return Err(Error::SiteOutOfRange {
                row,
                col,
                n: self.n,
            });
        }
        Ok((row - 1) * self.n + (col - 1))
    }
}

impl Display for Percolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.n {
            for col in 0..self.n {
                if self.grid[row * self.n + col] {
                    write!(f, ".")?;
                } else {
                    write!(f, "#")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
