//! Assigns distances to stops inserted into a route.
//!
//! A route's stops are ordered by an integer distance. A new stop is placed
//! behind an anchor: the stop it should follow, or the last stop when no
//! anchor is given. It gets the midpoint between that anchor and the next
//! stop, or `DISTANCE_STEP` more than the anchor when nothing follows. When
//! two neighbours are too close for a midpoint the route is renumbered once.

use std::str::FromStr;

use log::debug;
use model::{Resource, ResourceKind, Route, RouteStop, RouteStopKey, Stop};
use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::{
    database::{Database, DatabaseError, Repo, RouteStopRepo},
    service::{self, not_found, write_failed},
    session::Session,
    ServiceResult,
};

/// Gap left between stops appended to a route, and between stops after a
/// route has been renumbered.
pub const DISTANCE_STEP: i32 = 200;

/// Which route stops may serve as anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorScope {
    /// Only stops on the route being edited.
    #[default]
    Route,
    /// Stops on any route. Kept for compatibility with data written that way.
    Global,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown anchor scope {0:?}, expected \"route\" or \"global\"")]
pub struct UnknownAnchorScope(pub String);

impl FromStr for AnchorScope {
    type Err = UnknownAnchorScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "route" => Ok(Self::Route),
            "global" => Ok(Self::Global),
            _ => Err(UnknownAnchorScope(s.to_owned())),
        }
    }
}

/// The distances a new stop goes between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub previous: i32,
    pub next: Option<i32>,
}

impl Anchors {
    /// `None` if no integer lies strictly between the anchors, or the result
    /// does not fit a distance.
    pub fn free_distance(&self) -> Option<i32> {
        match self.next {
            Some(next) => {
                let (previous, next) = (i64::from(self.previous), i64::from(next));
                if next - previous < 2 {
                    return None;
                }
                i32::try_from((previous + next).div_euclid(2)).ok()
            }
            None => self.previous.checked_add(DISTANCE_STEP),
        }
    }
}

/// Places `stop_id` on `route_id` behind `after` (or at the end) and commits.
/// Returns the stored route stop.
pub async fn place<D: Database>(
    session: &mut Session<D>,
    scope: AnchorScope,
    route_id: &Id<Route>,
    stop_id: &Id<Stop>,
    after: Option<&Id<Stop>>,
) -> ServiceResult<RouteStop> {
    let tx = session.tx().await?;
    let written = match write_placement(tx, scope, route_id, stop_id, after).await {
        Ok(route_stop) => route_stop,
        Err(why) => {
            session.rollback();
            return Err(why);
        }
    };
    session
        .commit()
        .await
        .map_err(|why| write_failed(ResourceKind::RouteStop, why))?;
    service::get(session, &written.id()).await
}

async fn write_placement<T>(
    tx: &mut T,
    scope: AnchorScope,
    route_id: &Id<Route>,
    stop_id: &Id<Stop>,
    after: Option<&Id<Stop>>,
) -> ServiceResult<RouteStop>
where
    T: RouteStopRepo + Send,
{
    let anchors = select_anchors(tx, scope, route_id, after).await?;
    let distance = match anchors.free_distance() {
        Some(distance) => distance,
        None => {
            debug!("no free distance between {anchors:?} on route {route_id}, renumbering");
            tx.respace(route_id, DISTANCE_STEP)
                .await
                .map_err(|why| write_failed(ResourceKind::RouteStop, why))?;
            let anchors = select_anchors(tx, scope, route_id, after).await?;
            anchors.free_distance().ok_or_else(|| {
                write_failed(
                    ResourceKind::RouteStop,
                    DatabaseError::Integrity(format!(
                        "no free distance between {} and {:?} after renumbering route {route_id}",
                        anchors.previous, anchors.next
                    )),
                )
            })?
        }
    };
    debug!(
        "placing stop {stop_id} on route {route_id} at {distance} ({:?} scope)",
        scope
    );
    let route_stop = RouteStop {
        route_id: *route_id,
        stop_id: *stop_id,
        distance,
    };
    Repo::<RouteStop>::put(tx, &route_stop)
        .await
        .map_err(|why| write_failed(ResourceKind::RouteStop, why))
}

async fn select_anchors<T>(
    tx: &mut T,
    scope: AnchorScope,
    route_id: &Id<Route>,
    after: Option<&Id<Stop>>,
) -> ServiceResult<Anchors>
where
    T: RouteStopRepo + Send,
{
    let scoped = match scope {
        AnchorScope::Route => Some(route_id),
        AnchorScope::Global => None,
    };
    let previous = match after {
        Some(after) => {
            // an explicit anchor always has to be on the route itself
            let key: Id<RouteStop> = RouteStopKey::new(*route_id, *after).into();
            Repo::<RouteStop>::get(tx, &key)
                .await?
                .ok_or_else(|| not_found(&key))?
                .distance
        }
        None => tx
            .last(scoped)
            .await?
            .map_or(-DISTANCE_STEP, |last| last.distance),
    };
    let next = tx
        .next_after(scoped, previous)
        .await?
        .map(|next| next.distance);
    let anchors = Anchors { previous, next };
    debug!("anchors on route {route_id}: {anchors:?}");
    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::MemoryDatabase,
        service::{
            fixtures, NodeService, ResourceService, RouteService, RouteStopService,
            StopService, TypeService,
        },
        ServiceError,
    };

    #[test]
    fn test_free_distance() {
        let between = |previous, next| Anchors { previous, next }.free_distance();
        assert_eq!(between(200, Some(500)), Some(350));
        assert_eq!(between(500, None), Some(700));
        assert_eq!(between(-DISTANCE_STEP, None), Some(0));
        assert_eq!(between(0, Some(3)), Some(1));
        assert_eq!(between(0, Some(2)), Some(1));
        assert_eq!(between(4, Some(5)), None);
        assert_eq!(between(i32::MAX, None), None);
        // floors towards negative infinity
        assert_eq!(between(-3, Some(0)), Some(-2));
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!("route".parse::<AnchorScope>().unwrap(), AnchorScope::Route);
        assert_eq!("Global".parse::<AnchorScope>().unwrap(), AnchorScope::Global);
        assert!("everywhere".parse::<AnchorScope>().is_err());
    }

    struct Network {
        session: Session<MemoryDatabase>,
        routes: Vec<Route>,
        stops: Vec<Stop>,
    }

    /// Two routes and `stop_count` stops, nothing placed yet.
    async fn network(stop_count: usize) -> Network {
        let mut session = Session::new(MemoryDatabase::default());
        TypeService::new(&mut session)
            .create(fixtures::transport_type("bus"))
            .await
            .unwrap();
        let mut routes = Vec::new();
        for number in ["300", "310"] {
            routes.push(
                RouteService::new(&mut session)
                    .update(fixtures::route(number, "bus"))
                    .await
                    .unwrap(),
            );
        }
        let node = NodeService::new(&mut session)
            .update(fixtures::node("Raisdorf"))
            .await
            .unwrap();
        let mut stops = Vec::new();
        for index in 0..stop_count {
            let lat = format!("54.{index:02}");
            stops.push(
                StopService::new(&mut session)
                    .update(fixtures::stop(node.id, &lat, "10.25"))
                    .await
                    .unwrap(),
            );
        }
        Network {
            session,
            routes,
            stops,
        }
    }

    async fn link(network: &mut Network, route: usize, stop: usize, distance: i32) {
        let route_stop = RouteStop {
            route_id: network.routes[route].id,
            stop_id: network.stops[stop].id,
            distance,
        };
        RouteStopService::new(&mut network.session)
            .update(route_stop)
            .await
            .unwrap();
    }

    async fn distances(network: &mut Network, route: usize) -> Vec<i32> {
        let route_id = network.routes[route].id;
        RouteStopService::new(&mut network.session)
            .list_filtered(Some(&route_id), None)
            .await
            .unwrap()
            .into_iter()
            .map(|route_stop| route_stop.distance)
            .collect()
    }

    #[tokio::test]
    async fn test_first_stop_starts_at_zero() {
        let mut network = network(1).await;
        let (route_id, stop_id) = (network.routes[0].id, network.stops[0].id);
        let placed = RouteStopService::new(&mut network.session)
            .place(&route_id, &stop_id, None)
            .await
            .unwrap();
        assert_eq!(placed.distance, 0);
        assert_eq!(placed.key(), RouteStopKey::new(route_id, stop_id));
    }

    #[tokio::test]
    async fn test_append_and_insert_between() {
        let mut network = network(4).await;
        link(&mut network, 0, 0, 200).await;
        link(&mut network, 0, 1, 500).await;
        let route_id = network.routes[0].id;
        let (first, third, fourth) = (
            network.stops[0].id,
            network.stops[2].id,
            network.stops[3].id,
        );

        let mut service = RouteStopService::new(&mut network.session);
        let appended = service.place(&route_id, &third, None).await.unwrap();
        assert_eq!(appended.distance, 700);
        let inserted = service
            .place(&route_id, &fourth, Some(&first))
            .await
            .unwrap();
        assert_eq!(inserted.distance, 350);

        assert_eq!(distances(&mut network, 0).await, vec![200, 350, 500, 700]);
    }

    #[tokio::test]
    async fn test_replacing_moves_existing_stop() {
        let mut network = network(3).await;
        link(&mut network, 0, 0, 0).await;
        link(&mut network, 0, 1, 200).await;
        link(&mut network, 0, 2, 400).await;
        let route_id = network.routes[0].id;
        let (first, last) = (network.stops[0].id, network.stops[2].id);

        let moved = RouteStopService::new(&mut network.session)
            .place(&route_id, &last, Some(&first))
            .await
            .unwrap();
        assert_eq!(moved.distance, 100);
        assert_eq!(distances(&mut network, 0).await, vec![0, 100, 200]);
    }

    #[tokio::test]
    async fn test_unknown_anchor_is_not_found() {
        let mut network = network(2).await;
        let route_id = network.routes[0].id;
        let (stop, missing) = (network.stops[0].id, network.stops[1].id);
        let result = RouteStopService::new(&mut network.session)
            .place(&route_id, &stop, Some(&missing))
            .await;
        match result {
            Err(ServiceError::ResourceNotFound { kind, identifier }) => {
                assert_eq!(kind, ResourceKind::RouteStop);
                assert_eq!(identifier, format!("({route_id}, {missing})"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_route_scope_ignores_other_routes() {
        let mut network = network(2).await;
        link(&mut network, 1, 0, 1000).await;
        let (route_id, stop_id) = (network.routes[0].id, network.stops[1].id);
        let placed = RouteStopService::new(&mut network.session)
            .place(&route_id, &stop_id, None)
            .await
            .unwrap();
        assert_eq!(placed.distance, 0);
    }

    #[tokio::test]
    async fn test_global_scope_uses_every_route() {
        let mut network = network(2).await;
        link(&mut network, 1, 0, 1000).await;
        let (route_id, stop_id) = (network.routes[0].id, network.stops[1].id);
        let placed = RouteStopService::new(&mut network.session)
            .with_scope(AnchorScope::Global)
            .place(&route_id, &stop_id, None)
            .await
            .unwrap();
        assert_eq!(placed.distance, 1200);
    }

    #[tokio::test]
    async fn test_collapsed_gap_renumbers_route() {
        let mut network = network(3).await;
        link(&mut network, 0, 0, 10).await;
        link(&mut network, 0, 1, 11).await;
        let route_id = network.routes[0].id;
        let (first, new) = (network.stops[0].id, network.stops[2].id);

        let placed = RouteStopService::new(&mut network.session)
            .place(&route_id, &new, Some(&first))
            .await
            .unwrap();
        assert_eq!(placed.distance, 100);
        assert_eq!(distances(&mut network, 0).await, vec![0, 100, 200]);
    }

    #[tokio::test]
    async fn test_global_gap_that_survives_renumbering_is_rejected() {
        let mut network = network(3).await;
        link(&mut network, 0, 0, 0).await;
        link(&mut network, 1, 1, 1).await;
        let route_id = network.routes[0].id;
        let (first, new) = (network.stops[0].id, network.stops[2].id);

        let result = RouteStopService::new(&mut network.session)
            .with_scope(AnchorScope::Global)
            .place(&route_id, &new, Some(&first))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::DatabaseIntegrityViolated {
                kind: ResourceKind::RouteStop,
                ..
            })
        ));
        assert_eq!(distances(&mut network, 0).await, vec![0]);
    }

    #[tokio::test]
    async fn test_distances_stay_strictly_increasing() {
        let mut network = network(12).await;
        let route_id = network.routes[0].id;
        let stops = network.stops.iter().map(|stop| stop.id).collect::<Vec<_>>();
        let mut service = RouteStopService::new(&mut network.session);
        service.place(&route_id, &stops[0], None).await.unwrap();
        // keep inserting right behind the first stop to exhaust the gap
        for stop in &stops[1..] {
            service
                .place(&route_id, stop, Some(&stops[0]))
                .await
                .unwrap();
        }
        let distances = distances(&mut network, 0).await;
        assert_eq!(distances.len(), stops.len());
        assert!(distances.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
