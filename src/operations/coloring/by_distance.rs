use std::collections::VecDeque;

use crate::geometry::{EdgeColor, EdgeSegment, Shape};

use super::{find_corners, split_teardrop, symmetrical_trichotomy, Seed};

/// Sample count per edge when measuring the gap between two splines.
const EDGE_DISTANCE_PRECISION: u32 = 16;

/// Upper bound on recoloring steps when inserting a conflict edge.
const MAX_RECOLOR_STEPS: usize = 16;

/// Index of the preferred color for each mask of still-allowed colors.
const FIRST_POSSIBLE_COLOR: [i8; 8] = [-1, 0, 1, 0, 2, 2, 1, 0];

const COLORS: [EdgeColor; 3] = [EdgeColor::YELLOW, EdgeColor::CYAN, EdgeColor::MAGENTA];

/// Splines as runs of `(contour, edge)` references.
struct Splines {
    edges: Vec<(usize, usize)>,
    starts: Vec<usize>,
}

impl Splines {
    fn count(&self) -> usize {
        self.starts.len() - 1
    }

    fn members(&self, spline: usize) -> &[(usize, usize)] {
        &self.edges[self.starts[spline]..self.starts[spline + 1]]
    }
}

/// Treats splines as vertices of a conflict graph and adds edges between
/// them in order of increasing distance, as long as the graph remains
/// three-colorable within a bounded number of recoloring steps. Adjacent
/// splines always conflict.
pub(super) fn color_shape(shape: &mut Shape, angle_threshold: f64, mut seed: Seed) {
    let splines = collect_splines(shape, angle_threshold.sin());
    let spline_count = splines.count();
    if spline_count == 0 {
        return;
    }

    let mut distance_matrix = vec![0.0; spline_count * spline_count];
    for i in 0..spline_count {
        distance_matrix[i * spline_count + i] = -1.0;
        for j in i + 1..spline_count {
            let distance = spline_to_spline_distance(shape, splines.members(i), splines.members(j));
            distance_matrix[i * spline_count + j] = distance;
            distance_matrix[j * spline_count + i] = distance;
        }
    }

    let mut graph_edges: Vec<(f64, usize, usize)> = (0..spline_count)
        .flat_map(|i| (i + 1..spline_count).map(move |j| (i, j)))
        .map(|(i, j)| (distance_matrix[i * spline_count + j], i, j))
        .collect();
    graph_edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut graph = ConflictGraph::new(spline_count);
    let touching = graph_edges.iter().take_while(|(d, _, _)| *d == 0.0).count();
    for &(_, a, b) in &graph_edges[..touching] {
        graph.connect(a, b);
    }
    graph.color_second_degree(&mut seed);
    for &(_, a, b) in &graph_edges[touching..] {
        graph.try_add_edge(a, b);
    }

    for spline in 0..spline_count {
        let color = COLORS[usize::try_from(graph.coloring[spline]).unwrap_or(0)];
        for &(contour, edge) in splines.members(spline) {
            shape.contours[contour].edges[edge].set_color(color);
        }
    }
}

/// Splits teardrops where needed and groups the shape's edges into splines.
/// Edges in the middle third of a teardrop become white and belong to no spline.
fn collect_splines(shape: &mut Shape, cross_threshold: f64) -> Splines {
    let mut edges = Vec::new();
    let mut starts = Vec::new();
    for (contour_index, contour) in shape.contours.iter_mut().enumerate() {
        if contour.is_empty() {
            continue;
        }
        let mut corners = find_corners(contour, cross_threshold);
        starts.push(edges.len());
        match corners.len() {
            0 => edges.extend((0..contour.len()).map(|e| (contour_index, e))),
            1 => {
                if contour.len() < 3 {
                    contour.edges = split_teardrop(contour, corners[0]);
                    corners[0] = 0;
                }
                let m = contour.len();
                for i in 0..m {
                    let index = (corners[0] + i) % m;
                    if i == m / 2 {
                        starts.push(edges.len());
                    }
                    if symmetrical_trichotomy(i, m) == 0 {
                        contour.edges[index].set_color(EdgeColor::WHITE);
                    } else {
                        edges.push((contour_index, index));
                    }
                }
            }
            corner_count => {
                let m = contour.len();
                let start = corners[0];
                let mut corner = 0;
                for i in 0..m {
                    let index = (start + i) % m;
                    if corner + 1 < corner_count && corners[corner + 1] == index {
                        starts.push(edges.len());
                        corner += 1;
                    }
                    edges.push((contour_index, index));
                }
            }
        }
    }
    starts.push(edges.len());
    Splines { edges, starts }
}

#[allow(clippy::float_cmp)]
fn edge_to_edge_distance(a: &EdgeSegment, b: &EdgeSegment) -> f64 {
    let (a0, a1) = (a.start_point(), a.end_point());
    let (b0, b1) = (b.start_point(), b.end_point());
    if a0 == b0 || a0 == b1 || a1 == b0 || a1 == b1 {
        return 0.0;
    }
    let step = 1.0 / f64::from(EDGE_DISTANCE_PRECISION);
    let mut min_distance = (b0 - a0).norm();
    for i in 0..=EDGE_DISTANCE_PRECISION {
        let t = step * f64::from(i);
        min_distance = min_distance.min(a.signed_distance(b.point(t)).0.distance.abs());
        min_distance = min_distance.min(b.signed_distance(a.point(t)).0.distance.abs());
    }
    min_distance
}

fn spline_to_spline_distance(shape: &Shape, a: &[(usize, usize)], b: &[(usize, usize)]) -> f64 {
    let edge = |&(c, e): &(usize, usize)| &shape.contours[c].edges[e];
    a.iter()
        .flat_map(|ea| b.iter().map(move |eb| (ea, eb)))
        .map(|(ea, eb)| edge_to_edge_distance(edge(ea), edge(eb)))
        .fold(f64::MAX, f64::min)
}

/// Symmetric adjacency matrix with a color index per vertex; `-1` marks a
/// vertex awaiting recoloring.
struct ConflictGraph {
    size: usize,
    adjacency: Vec<bool>,
    coloring: Vec<i8>,
}

impl ConflictGraph {
    fn new(size: usize) -> Self {
        Self {
            size,
            adjacency: vec![false; size * size],
            coloring: vec![0; size],
        }
    }

    fn adjacent(&self, a: usize, b: usize) -> bool {
        self.adjacency[a * self.size + b]
    }

    fn set_adjacent(&mut self, a: usize, b: usize, value: bool) {
        self.adjacency[a * self.size + b] = value;
        self.adjacency[b * self.size + a] = value;
    }

    fn connect(&mut self, a: usize, b: usize) {
        self.set_adjacent(a, b, true);
    }

    /// Greedy coloring in vertex order, using only neighbours colored so far.
    #[allow(clippy::cast_possible_truncation)]
    fn color_second_degree(&mut self, seed: &mut Seed) {
        for i in 0..self.size {
            let mut possible = 7u8;
            for j in 0..i {
                if self.adjacent(i, j) {
                    possible &= !(1u8 << self.coloring[j]);
                }
            }
            let color = match possible {
                2 => 1,
                3 => seed.extract2(),
                4 => 2,
                5 => u8::from(seed.extract2() == 0) << 1,
                6 => seed.extract2() + 1,
                7 => ((usize::from(seed.extract3()) + i) % 3) as u8,
                _ => 0,
            };
            self.coloring[i] = i8::try_from(color).unwrap_or(0);
        }
    }

    fn possible_colors(coloring: &[i8], adjacency: &[bool]) -> u8 {
        let used = coloring
            .iter()
            .zip(adjacency)
            .filter(|(c, adjacent)| **adjacent && **c >= 0)
            .fold(0u8, |used, (&c, _)| used | 1u8 << c);
        7 & !used
    }

    fn uncolor_same_neighbours(&self, coloring: &mut [i8], queue: &mut VecDeque<usize>, vertex: usize) {
        let order = (vertex + 1..self.size).chain(0..vertex);
        for i in order {
            if self.adjacent(vertex, i) && coloring[i] == coloring[vertex] {
                coloring[i] = -1;
                queue.push_back(i);
            }
        }
    }

    /// Adds a conflict between `a` and `b`, recoloring `b` and its
    /// neighbourhood if needed. The edge is dropped if recoloring does not
    /// settle within [`MAX_RECOLOR_STEPS`].
    #[allow(clippy::cast_possible_truncation)]
    fn try_add_edge(&mut self, a: usize, b: usize) -> bool {
        self.connect(a, b);
        if self.coloring[a] != self.coloring[b] {
            return true;
        }
        let size = self.size;
        let row = |v: usize| v * size..(v + 1) * size;
        let b_possible = Self::possible_colors(&self.coloring, &self.adjacency[row(b)]);
        if b_possible != 0 {
            self.coloring[b] = FIRST_POSSIBLE_COLOR[usize::from(b_possible)];
            return true;
        }

        let mut coloring = self.coloring.clone();
        let mut queue = VecDeque::new();
        coloring[b] = FIRST_POSSIBLE_COLOR[usize::from(7 & !(1u8 << coloring[a]))];
        self.uncolor_same_neighbours(&mut coloring, &mut queue, b);
        let mut step = 0usize;
        while step < MAX_RECOLOR_STEPS {
            let Some(i) = queue.pop_front() else {
                break;
            };
            let possible = Self::possible_colors(&coloring, &self.adjacency[row(i)]);
            if possible != 0 {
                coloring[i] = FIRST_POSSIBLE_COLOR[usize::from(possible)];
                continue;
            }
            loop {
                coloring[i] = (step % 3) as i8;
                step += 1;
                if !(self.adjacent(i, a) && coloring[i] == coloring[a]) {
                    break;
                }
            }
            self.uncolor_same_neighbours(&mut coloring, &mut queue, i);
        }
        if !queue.is_empty() {
            self.set_adjacent(a, b, false);
            return false;
        }
        self.coloring = coloring;
        true
    }
}
