use std::collections::HashMap;

use abstutil::Timer;
use geom::{HashableLonLat, Line, LonLat, ON_SEGMENT_TOLERANCE};

use crate::{IntersectionPoint, RoadSegment};

/// Finds every place where two different roads cross or touch, and splits both roads there by
/// inserting a vertex. Every pair of roads is checked, and for each pair, every pair of
/// sub-segments, so this is quadratic in both the number of roads and their vertex counts.
///
/// Hits within 6 decimal places of each other become one `IntersectionPoint`. Running this again
/// on its own output finds the same points and inserts nothing new.
pub fn find_intersections(
    mut roads: Vec<RoadSegment>,
    timer: &mut Timer,
) -> (Vec<RoadSegment>, Vec<IntersectionPoint>) {
    timer.start("find intersections");

    let mut intersections: Vec<IntersectionPoint> = Vec::new();
    let mut index: HashMap<HashableLonLat, usize> = HashMap::new();
    // One entry per road involved in every hit: (road index, segment index, point)
    let mut splits: Vec<(usize, usize, LonLat)> = Vec::new();

    timer.start_iter("check road pairs", roads.len());
    for idx1 in 0..roads.len() {
        timer.next();
        for idx2 in (idx1 + 1)..roads.len() {
            let (r1, r2) = (&roads[idx1], &roads[idx2]);
            for (seg1, l1) in r1.lines().enumerate() {
                for (seg2, l2) in r2.lines().enumerate() {
                    let pt = match l1.intersection(&l2) {
                        Some(pt) => pt,
                        None => continue,
                    };
                    splits.push((idx1, seg1, pt));
                    splits.push((idx2, seg2, pt));

                    let key = pt.to_hashable();
                    if let Some(existing) = index.get(&key) {
                        let i = &mut intersections[*existing];
                        i.add_road(r1.id);
                        i.add_road(r2.id);
                    } else {
                        index.insert(key, intersections.len());
                        intersections.push(IntersectionPoint::new(pt, r1.id, r2.id));
                    }
                }
            }
        }
    }

    // Work backwards through each road's segments, so inserting a vertex never shifts the index
    // of a segment still waiting for its splits. Within one segment, the point farthest from the
    // segment's start goes in first, so every later (nearer) point still lands on the segment
    // right after its start.
    let mut splits: Vec<(usize, usize, f64, LonLat)> = splits
        .into_iter()
        .map(|(idx, seg, pt)| (idx, seg, roads[idx].pts[seg].degree_dist(pt), pt))
        .collect();
    splits.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(b.1.cmp(&a.1))
            .then(b.2.total_cmp(&a.2))
    });
    let mut inserted = 0;
    for (idx, seg, _, pt) in splits {
        if splice_vertex(&mut roads[idx].pts, seg, pt) {
            inserted += 1;
        }
    }
    info!(
        "Found {} intersections between {} roads, inserting {} new vertices",
        intersections.len(),
        roads.len(),
        inserted
    );

    timer.stop("find intersections");
    (roads, intersections)
}

/// Inserts `pt` into the segment starting at vertex `seg`, unless some existing vertex is already
/// within tolerance or the point isn't on that segment. Returns true if the point was inserted.
pub fn splice_vertex(pts: &mut Vec<LonLat>, seg: usize, pt: LonLat) -> bool {
    if pts
        .iter()
        .any(|existing| existing.approx_eq(pt, ON_SEGMENT_TOLERANCE))
    {
        return false;
    }
    if seg + 1 >= pts.len() {
        return false;
    }
    if !Line::new(pts[seg], pts[seg + 1]).contains_pt(pt, ON_SEGMENT_TOLERANCE) {
        return false;
    }
    pts.insert(seg + 1, pt);
    true
}
