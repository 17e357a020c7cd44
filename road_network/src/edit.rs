use abstutil::Timer;
use geom::{HashableLonLat, LonLat};

use crate::{find_intersections, AnalysisError, AnalysisResult, RoadClass, RoadId, RoadSegment};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureId {
    Road(RoadId),
    Intersection(HashableLonLat),
}

/// Interactive edits to an analysis result. The selection lives here, not in some global, and
/// the session owns its own copy of every road.
pub struct EditSession {
    result: AnalysisResult,
    selected: Option<FeatureId>,
    next_road_id: i64,
}

impl EditSession {
    pub fn new(result: AnalysisResult) -> EditSession {
        let next_road_id = result
            .roads
            .iter()
            .map(|r| r.id.0)
            .max()
            .map(|id| id + 1)
            .unwrap_or(0);
        EditSession {
            result,
            selected: None,
            next_road_id,
        }
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn into_result(self) -> AnalysisResult {
        self.result
    }

    pub fn selected(&self) -> Option<FeatureId> {
        self.selected
    }

    pub fn select(&mut self, id: FeatureId) -> Result<(), AnalysisError> {
        let exists = match id {
            FeatureId::Road(r) => self.result.get_road(r).is_some(),
            FeatureId::Intersection(key) => self.result.get_intersection(key).is_some(),
        };
        if !exists {
            return Err(AnalysisError::input(format!("{:?} doesn't exist", id)));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Removes whatever's selected and returns it. Deleting a road also detaches it from every
    /// intersection; intersections left with fewer than 2 roads disappear.
    pub fn delete_selected(&mut self) -> Option<FeatureId> {
        let id = self.selected.take()?;
        match id {
            FeatureId::Road(r) => {
                self.result.roads.retain(|road| road.id != r);
                for i in &mut self.result.intersections {
                    i.connected_roads.retain(|x| *x != r);
                }
                self.result
                    .intersections
                    .retain(|i| i.connected_roads.len() >= 2);
            }
            FeatureId::Intersection(key) => {
                self.result.intersections.retain(|i| i.key() != key);
            }
        }
        Some(id)
    }

    pub fn add_road(
        &mut self,
        pts: Vec<LonLat>,
        class: RoadClass,
    ) -> Result<RoadId, AnalysisError> {
        if pts.len() < 2 {
            return Err(AnalysisError::input("A road needs at least 2 points"));
        }
        if pts.iter().any(|pt| !pt.is_finite()) {
            return Err(AnalysisError::input("A road can't have non-finite points"));
        }
        let id = RoadId(self.next_road_id);
        self.next_road_id += 1;
        self.result.roads.push(RoadSegment::new(id, class, pts));
        Ok(id)
    }

    pub fn move_vertex(
        &mut self,
        road: RoadId,
        idx: usize,
        pt: LonLat,
    ) -> Result<(), AnalysisError> {
        if !pt.is_finite() {
            return Err(AnalysisError::input(format!("Can't move a vertex to {}", pt)));
        }
        let r = self
            .result
            .roads
            .iter_mut()
            .find(|r| r.id == road)
            .ok_or_else(|| AnalysisError::input(format!("{} doesn't exist", road)))?;
        let len = r.pts.len();
        let vertex = r.pts.get_mut(idx).ok_or_else(|| {
            AnalysisError::input(format!("{} only has {} points, not {}", road, len, idx))
        })?;
        *vertex = pt;
        Ok(())
    }

    /// Throws away the current intersections and finds them again over the edited roads. A
    /// selected intersection that no longer exists is deselected.
    pub fn rebuild_intersections(&mut self, timer: &mut Timer) {
        let roads = std::mem::take(&mut self.result.roads);
        let (roads, intersections) = find_intersections(roads, timer);
        self.result.roads = roads;
        self.result.intersections = intersections;

        if let Some(FeatureId::Intersection(key)) = self.selected {
            if self.result.get_intersection(key).is_none() {
                self.selected = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross() -> AnalysisResult {
        let roads = vec![
            RoadSegment::new(
                RoadId(100),
                RoadClass::highway("primary"),
                vec![LonLat::new(-1.0, 0.0), LonLat::new(1.0, 0.0)],
            ),
            RoadSegment::new(
                RoadId(200),
                RoadClass::highway("residential"),
                vec![LonLat::new(0.0, -1.0), LonLat::new(0.0, 1.0)],
            ),
        ];
        let (roads, intersections) = find_intersections(roads, &mut Timer::throwaway());
        AnalysisResult {
            roads,
            intersections,
            ..Default::default()
        }
    }

    #[test]
    fn select_and_delete_road() {
        let mut session = EditSession::new(cross());
        assert!(session.select(FeatureId::Road(RoadId(5))).is_err());
        assert_eq!(session.selected(), None);

        session.select(FeatureId::Road(RoadId(100))).unwrap();
        assert_eq!(session.delete_selected(), Some(FeatureId::Road(RoadId(100))));
        assert_eq!(session.selected(), None);
        assert_eq!(session.result().roads.len(), 1);
        // The intersection only had one road left
        assert!(session.result().intersections.is_empty());
        assert_eq!(session.delete_selected(), None);
    }

    #[test]
    fn delete_intersection() {
        let mut session = EditSession::new(cross());
        let key = LonLat::new(0.0, 0.0).to_hashable();
        session.select(FeatureId::Intersection(key)).unwrap();
        session.delete_selected();
        assert!(session.result().intersections.is_empty());
        assert_eq!(session.result().roads.len(), 2);
    }

    #[test]
    fn add_road_and_rebuild() {
        let mut session = EditSession::new(cross());
        let id = session
            .add_road(
                vec![LonLat::new(0.5, -1.0), LonLat::new(0.5, 1.0)],
                RoadClass::highway("service"),
            )
            .unwrap();
        assert_eq!(id, RoadId(201));
        assert!(session
            .add_road(vec![LonLat::new(0.0, 0.0)], RoadClass::highway("service"))
            .is_err());

        session.rebuild_intersections(&mut Timer::throwaway());
        let result = session.into_result();
        assert_eq!(result.intersections.len(), 2);
        assert!(result
            .intersections
            .iter()
            .any(|i| i.connected_roads == vec![RoadId(100), RoadId(201)]));
    }

    #[test]
    fn move_vertex_then_rebuild() {
        let mut session = EditSession::new(cross());
        let key = LonLat::new(0.0, 0.0).to_hashable();
        session.select(FeatureId::Intersection(key)).unwrap();

        // Road 200 is now [(0, -1), (0, 0), (0, 1)]. Pull it entirely above road 100.
        session
            .move_vertex(RoadId(200), 0, LonLat::new(0.0, 0.5))
            .unwrap();
        session
            .move_vertex(RoadId(200), 1, LonLat::new(0.0, 0.75))
            .unwrap();
        let err = session
            .move_vertex(RoadId(200), 10, LonLat::new(0.0, 0.0))
            .unwrap_err();
        assert!(
            err.to_string().contains("RoadId(200) only has 3 points, not 10"),
            "{}",
            err
        );
        assert!(session
            .move_vertex(RoadId(999), 0, LonLat::new(0.0, 0.0))
            .is_err());

        session.rebuild_intersections(&mut Timer::throwaway());
        assert!(session.result().intersections.is_empty());
        assert_eq!(session.selected(), None);
    }
}
