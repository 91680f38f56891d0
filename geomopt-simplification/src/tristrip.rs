//! Triangle strip generation
//!
//! Strips use the usual alternating convention: triangle `i` of a strip is
//! `(s[i], s[i+1], s[i+2])` for even `i` and `(s[i+1], s[i], s[i+2])` for
//! odd `i`, which keeps the winding of every source face.

use std::collections::HashMap;

/// Build triangle strips covering every face exactly once.
///
/// Greedy: each unvisited face seeds a strip, tried in all three rotations,
/// and the longest forward extension through unvisited neighbors wins.
pub fn build_strips(faces: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut edge_faces: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (fi, face) in faces.iter().enumerate() {
        for j in 0..3 {
            let (a, b) = (face[j], face[(j + 1) % 3]);
            edge_faces.entry((a.min(b), a.max(b))).or_default().push(fi);
        }
    }

    let mut visited = vec![false; faces.len()];
    let mut strips = Vec::new();

    for seed in 0..faces.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;

        let face = faces[seed];
        let mut best: Option<(Vec<usize>, Vec<usize>)> = None;
        for rotation in 0..3 {
            let start = vec![
                face[rotation],
                face[(rotation + 1) % 3],
                face[(rotation + 2) % 3],
            ];
            let (strip, used) = extend_strip(faces, &edge_faces, &visited, start);
            if best.as_ref().map_or(true, |(_, u)| used.len() > u.len()) {
                best = Some((strip, used));
            }
        }

        if let Some((strip, used)) = best {
            for fi in used {
                visited[fi] = true;
            }
            strips.push(strip);
        }
    }

    strips
}

/// Grow `strip` forward; returns the strip and the faces it absorbed.
fn extend_strip(
    faces: &[[usize; 3]],
    edge_faces: &HashMap<(usize, usize), Vec<usize>>,
    visited: &[bool],
    mut strip: Vec<usize>,
) -> (Vec<usize>, Vec<usize>) {
    let mut used: Vec<usize> = Vec::new();

    loop {
        let n = strip.len();
        let (u, v) = (strip[n - 2], strip[n - 1]);
        let Some(candidates) = edge_faces.get(&(u.min(v), u.max(v))) else {
            break;
        };

        let index = n - 2;
        let next = candidates.iter().copied().find_map(|fi| {
            if visited[fi] || used.contains(&fi) {
                return None;
            }
            let face = faces[fi];
            let w = face.iter().copied().find(|&x| x != u && x != v)?;
            let tri = strip_triangle(u, v, w, index);
            same_winding(&face, &tri).then_some((fi, w))
        });

        match next {
            Some((fi, w)) => {
                used.push(fi);
                strip.push(w);
            }
            None => break,
        }
    }

    (strip, used)
}

#[inline]
fn strip_triangle(u: usize, v: usize, w: usize, index: usize) -> [usize; 3] {
    if index % 2 == 0 {
        [u, v, w]
    } else {
        [v, u, w]
    }
}

fn same_winding(face: &[usize; 3], tri: &[usize; 3]) -> bool {
    (0..3).any(|r| face[r] == tri[0] && face[(r + 1) % 3] == tri[1] && face[(r + 2) % 3] == tri[2])
}

/// Decode a strip back into triangles, skipping degenerate ones.
pub fn strip_triangles(strip: &[usize]) -> Vec<[usize; 3]> {
    if strip.len() < 3 {
        return Vec::new();
    }
    (0..strip.len() - 2)
        .map(|i| strip_triangle(strip[i], strip[i + 1], strip[i + 2], i))
        .filter(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
        .collect()
}
