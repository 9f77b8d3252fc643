//! Operations that build up several related rows in one transaction.

use log::debug;
use model::{
    node::NodeName, route::RouteNumber, Node, Resource, ResourceKind, Route, RouteStop,
    RouteStopKey, Stop, TransportType,
};
use utility::{
    geo::{Latitude, Longitude},
    id::Id,
};
use uuid::Uuid;

use crate::{
    database::{self, Database, DatabaseError, DatabaseOperations, Repo},
    service::{
        self, already_exists, NodeService, ResourceService, RouteService, StopService,
        TypeService,
    },
    session::Session,
    ServiceError, ServiceResult,
};

/// Distance between consecutive stops linked by [`NetworkService::add_route`]
/// and [`NetworkService::append_route_stop`].
pub const LINK_STEP: i32 = 100;

pub struct NetworkService<'s, D: Database> {
    session: &'s mut Session<D>,
}

impl<'s, D: Database> NetworkService<'s, D> {
    pub fn new(session: &'s mut Session<D>) -> Self {
        Self { session }
    }

    pub async fn add_type(&mut self, name: Id<TransportType>) -> ServiceResult<TransportType> {
        TypeService::new(self.session)
            .create(TransportType::new(name))
            .await
    }

    /// Creates a route serving `stops` in the given order.
    pub async fn add_route(
        &mut self,
        number: RouteNumber,
        type_name: Id<TransportType>,
        stops: &[Id<Stop>],
    ) -> ServiceResult<Route> {
        let route = Route {
            id: Id::generate(),
            number,
            type_name,
        };
        debug!("adding route {} with {} stops", route.id, stops.len());
        let written = write_route(self.session.tx().await?, &route, stops).await;
        service::finish(self.session, ResourceKind::Route, written).await?;
        service::get(self.session, &route.id).await
    }

    /// Creates a node with one stop per coordinate pair.
    pub async fn add_node(
        &mut self,
        name: NodeName,
        stops: &[(Latitude, Longitude)],
    ) -> ServiceResult<Node> {
        let node = Node {
            id: Id::generate(),
            name,
        };
        debug!("adding node {} with {} stops", node.id, stops.len());
        let written = write_node(self.session.tx().await?, &node, stops).await;
        service::finish(self.session, ResourceKind::Node, written).await?;
        service::get(self.session, &node.id).await
    }

    pub async fn add_stop(
        &mut self,
        node_id: Id<Node>,
        lat: Latitude,
        lon: Longitude,
    ) -> ServiceResult<Stop> {
        StopService::new(self.session)
            .update(Stop {
                id: Id::generate(),
                node_id,
                lat,
                lon,
            })
            .await
    }

    /// Links `stop_id` behind the last stop of `route_id`. Does not look for
    /// gaps like [`crate::placement::place`] does.
    pub async fn append_route_stop(
        &mut self,
        route_id: Id<Route>,
        stop_id: Id<Stop>,
    ) -> ServiceResult<RouteStop> {
        let key: Id<RouteStop> = RouteStopKey::new(route_id, stop_id).into();
        if service::contains(self.session, &key).await? {
            return Err(already_exists(&key));
        }
        let written = append(self.session.tx().await?, route_id, stop_id).await;
        let route_stop = service::finish(self.session, ResourceKind::RouteStop, written).await?;
        service::get(self.session, &route_stop.id()).await
    }

    /// Deletes the route, node or stop called `id`, whichever exists.
    pub async fn delete_unique(&mut self, id: Uuid) -> ServiceResult<()> {
        if service::contains::<Route, D>(self.session, &Id::new(id)).await? {
            return RouteService::new(self.session).delete(&Id::new(id)).await;
        }
        if service::contains::<Node, D>(self.session, &Id::new(id)).await? {
            return NodeService::new(self.session).delete(&Id::new(id)).await;
        }
        if service::contains::<Stop, D>(self.session, &Id::new(id)).await? {
            return StopService::new(self.session).delete(&Id::new(id)).await;
        }
        Err(ServiceError::ResourceNotFound {
            kind: ResourceKind::Unit,
            identifier: id.to_string(),
        })
    }
}

fn link_distance(position: usize) -> database::Result<i32> {
    i32::try_from(position)
        .ok()
        .and_then(|position| position.checked_mul(LINK_STEP))
        .ok_or_else(|| DatabaseError::Integrity(format!("no distance for position {position}")))
}

async fn write_route<T: DatabaseOperations>(
    tx: &mut T,
    route: &Route,
    stops: &[Id<Stop>],
) -> database::Result<()> {
    Repo::<Route>::put(tx, route).await?;
    for (position, stop_id) in stops.iter().enumerate() {
        let route_stop = RouteStop {
            route_id: route.id,
            stop_id: *stop_id,
            distance: link_distance(position)?,
        };
        if Repo::<RouteStop>::exists(tx, &route_stop.id()).await? {
            return Err(DatabaseError::Integrity(format!(
                "stop {stop_id} is listed more than once"
            )));
        }
        Repo::<RouteStop>::put(tx, &route_stop).await?;
    }
    Ok(())
}

async fn write_node<T: DatabaseOperations>(
    tx: &mut T,
    node: &Node,
    stops: &[(Latitude, Longitude)],
) -> database::Result<()> {
    Repo::<Node>::put(tx, node).await?;
    for (lat, lon) in stops {
        let stop = Stop {
            id: Id::generate(),
            node_id: node.id,
            lat: *lat,
            lon: *lon,
        };
        Repo::<Stop>::put(tx, &stop).await?;
    }
    Ok(())
}

async fn append<T: DatabaseOperations>(
    tx: &mut T,
    route_id: Id<Route>,
    stop_id: Id<Stop>,
) -> database::Result<RouteStop> {
    let distance = match tx.last(Some(&route_id)).await? {
        Some(last) => last.distance.checked_add(LINK_STEP).ok_or_else(|| {
            DatabaseError::Integrity(format!("route {route_id} has no room left at its end"))
        })?,
        None => 0,
    };
    debug!("appending stop {stop_id} to route {route_id} at {distance}");
    Repo::<RouteStop>::put(
        tx,
        &RouteStop {
            route_id,
            stop_id,
            distance,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use utility::bounded::BoundedString;

    use super::*;
    use crate::{memory::MemoryDatabase, service::fixtures};

    fn coordinates(lat: &str, lon: &str) -> (Latitude, Longitude) {
        (lat.parse().unwrap(), lon.parse().unwrap())
    }

    async fn seeded() -> (Session<MemoryDatabase>, Node, Vec<Stop>) {
        let mut session = Session::new(MemoryDatabase::default());
        let mut network = NetworkService::new(&mut session);
        network
            .add_type(fixtures::transport_type("bus").name)
            .await
            .unwrap();
        let node = network
            .add_node(
                BoundedString::new("Preetz, ZOB").unwrap(),
                &[
                    coordinates("54.2350", "10.2790"),
                    coordinates("54.2351", "10.2791"),
                    coordinates("54.2352", "10.2792"),
                ],
            )
            .await
            .unwrap();
        let stops = StopService::new(&mut session).list().await.unwrap();
        (session, node, stops)
    }

    #[tokio::test]
    async fn test_add_node_creates_stops() {
        let (_, node, stops) = seeded().await;
        assert_eq!(node.name.as_str(), "Preetz, ZOB");
        assert_eq!(stops.len(), 3);
        assert!(stops.iter().all(|stop| stop.node_id == node.id));
    }

    #[tokio::test]
    async fn test_add_route_links_stops_in_order() {
        let (mut session, _, stops) = seeded().await;
        let stop_ids = stops.iter().rev().map(|stop| stop.id).collect::<Vec<_>>();
        let route = NetworkService::new(&mut session)
            .add_route(
                BoundedString::new("300").unwrap(),
                fixtures::transport_type("bus").name,
                &stop_ids,
            )
            .await
            .unwrap();
        let linked = service::RouteStopService::new(&mut session)
            .list_filtered(Some(&route.id), None)
            .await
            .unwrap();
        assert_eq!(
            linked
                .iter()
                .map(|route_stop| (route_stop.stop_id, route_stop.distance))
                .collect::<Vec<_>>(),
            vec![(stop_ids[0], 0), (stop_ids[1], 100), (stop_ids[2], 200)]
        );
    }

    #[tokio::test]
    async fn test_add_route_rolls_back_on_unknown_stop() {
        let (mut session, _, _) = seeded().await;
        let result = NetworkService::new(&mut session)
            .add_route(
                BoundedString::new("300").unwrap(),
                fixtures::transport_type("bus").name,
                &[Id::generate()],
            )
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::DatabaseIntegrityViolated {
                kind: ResourceKind::Route,
                ..
            })
        ));
        assert!(RouteService::new(&mut session).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_route_stop() {
        let (mut session, _, stops) = seeded().await;
        let mut network = NetworkService::new(&mut session);
        let route = network
            .add_route(
                BoundedString::new("300").unwrap(),
                fixtures::transport_type("bus").name,
                &[],
            )
            .await
            .unwrap();
        let first = network.append_route_stop(route.id, stops[0].id).await.unwrap();
        let second = network.append_route_stop(route.id, stops[1].id).await.unwrap();
        assert_eq!((first.distance, second.distance), (0, 100));

        let again = network.append_route_stop(route.id, stops[0].id).await;
        assert!(matches!(
            again,
            Err(ServiceError::ResourceAlreadyExists {
                kind: ResourceKind::RouteStop,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_delete_unique() {
        let (mut session, node, stops) = seeded().await;
        let mut network = NetworkService::new(&mut session);

        let refused = network.delete_unique(node.id.raw()).await;
        assert!(matches!(
            refused,
            Err(ServiceError::DatabaseIntegrityViolated {
                kind: ResourceKind::Node,
                ..
            })
        ));

        for stop in &stops {
            network.delete_unique(stop.id.raw()).await.unwrap();
        }
        network.delete_unique(node.id.raw()).await.unwrap();

        let missing = network.delete_unique(node.id.raw()).await;
        assert!(matches!(
            missing,
            Err(ServiceError::ResourceNotFound {
                kind: ResourceKind::Unit,
                ..
            })
        ));
    }
}
