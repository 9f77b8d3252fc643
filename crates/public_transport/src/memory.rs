//! A [`Database`] kept in process memory.
//!
//! Enforces the same keys and constraints as the PostgreSQL schema, so it can
//! stand in for it in tests and demos. Transactions see a snapshot of the
//! committed tables. Their writes are recorded as changes which are replayed
//! onto the then current tables at commit.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use model::{Node, Resource, Route, RouteStop, Stop, TransportType};
use tokio::sync::Mutex;
use utility::{geo, id::Id};

use crate::database::{
    Database, DatabaseError, DatabaseTransaction, Repo, Result, RouteStopRepo, TypeRepo,
};

/// A stop as it is stored, with its location encoded.
#[derive(Debug, Clone)]
struct StopRow {
    id: Id<Stop>,
    node_id: Id<Node>,
    location: Vec<u8>,
}

impl StopRow {
    fn from_model(stop: &Stop) -> Result<Self> {
        Ok(Self {
            id: stop.id,
            node_id: stop.node_id,
            location: geo::encode(stop.lat, stop.lon).map_err(DatabaseError::other)?,
        })
    }

    fn to_model(&self) -> Result<Stop> {
        let (lat, lon) = geo::decode(&self.location).map_err(DatabaseError::other)?;
        Ok(Stop {
            id: self.id,
            node_id: self.node_id,
            lat,
            lon,
        })
    }
}

#[derive(Debug, Clone)]
enum Change {
    InsertType(TransportType),
    PutType(TransportType),
    RenameType(Id<TransportType>, TransportType),
    DeleteType(Id<TransportType>),
    PutRoute(Route),
    DeleteRoute(Id<Route>),
    PutNode(Node),
    DeleteNode(Id<Node>),
    PutStop(StopRow),
    DeleteStop(Id<Stop>),
    PutRouteStop(RouteStop),
    DeleteRouteStop(Id<RouteStop>),
    Respace(Id<Route>, i32),
}

fn duplicate_key(constraint: &str, key: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Integrity(format!(
        "duplicate key value violates unique constraint \"{constraint}\": ({key})"
    ))
}

fn missing_reference(constraint: &str, key: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Integrity(format!(
        "foreign key constraint \"{constraint}\" violated: ({key}) is not present"
    ))
}

#[derive(Debug, Clone, Default)]
struct Tables {
    types: IndexMap<Id<TransportType>, TransportType>,
    routes: IndexMap<Id<Route>, Route>,
    nodes: IndexMap<Id<Node>, Node>,
    stops: IndexMap<Id<Stop>, StopRow>,
    route_stops: IndexMap<Id<RouteStop>, RouteStop>,
}

impl Tables {
    fn apply(&mut self, change: &Change) -> Result<()> {
        match change {
            Change::InsertType(element) => {
                if self.types.contains_key(&element.name) {
                    return Err(duplicate_key("types_pkey", &element.name));
                }
                self.types.insert(element.name.clone(), element.clone());
            }
            Change::PutType(element) => {
                self.types.insert(element.name.clone(), element.clone());
            }
            Change::RenameType(name, element) => {
                if *name != element.name && self.types.contains_key(&element.name) {
                    return Err(duplicate_key("types_pkey", &element.name));
                }
                let index = self.types.get_index_of(name).ok_or(DatabaseError::NotFound)?;
                self.types.shift_remove_index(index);
                self.types
                    .shift_insert(index, element.name.clone(), element.clone());
            }
            Change::DeleteType(name) => {
                self.types.shift_remove(name).ok_or(DatabaseError::NotFound)?;
            }
            Change::PutRoute(element) => {
                self.routes.insert(element.id, element.clone());
            }
            Change::DeleteRoute(id) => {
                self.routes.shift_remove(id).ok_or(DatabaseError::NotFound)?;
            }
            Change::PutNode(element) => {
                self.nodes.insert(element.id, element.clone());
            }
            Change::DeleteNode(id) => {
                self.nodes.shift_remove(id).ok_or(DatabaseError::NotFound)?;
            }
            Change::PutStop(row) => {
                self.stops.insert(row.id, row.clone());
            }
            Change::DeleteStop(id) => {
                self.stops.shift_remove(id).ok_or(DatabaseError::NotFound)?;
            }
            Change::PutRouteStop(element) => {
                self.route_stops.insert(element.id(), element.clone());
            }
            Change::DeleteRouteStop(id) => {
                self.route_stops
                    .shift_remove(id)
                    .ok_or(DatabaseError::NotFound)?;
            }
            Change::Respace(route_id, step) => {
                let keys = self
                    .route_stops
                    .values()
                    .filter(|route_stop| route_stop.route_id == *route_id)
                    .sorted_by_key(|route_stop| route_stop.distance)
                    .map(Resource::id)
                    .collect_vec();
                for (position, key) in keys.into_iter().enumerate() {
                    let distance = i32::try_from(position)
                        .ok()
                        .and_then(|position| position.checked_mul(*step))
                        .ok_or_else(|| {
                            DatabaseError::Integrity(format!(
                                "route {route_id} is too long to be renumbered"
                            ))
                        })?;
                    if let Some(route_stop) = self.route_stops.get_mut(&key) {
                        route_stop.distance = distance;
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks every constraint of the schema against the whole tables.
    fn validate(&self) -> Result<()> {
        for route in self.routes.values() {
            if !self.types.contains_key(&route.type_name) {
                return Err(missing_reference(
                    "routes_type_name_fkey",
                    format!("type_name)=({}", route.type_name),
                ));
            }
        }
        let mut locations = HashSet::new();
        for stop in self.stops.values() {
            if !self.nodes.contains_key(&stop.node_id) {
                return Err(missing_reference(
                    "stops_node_id_fkey",
                    format!("node_id)=({}", stop.node_id),
                ));
            }
            if !locations.insert(stop.location.as_slice()) {
                return Err(duplicate_key("stops_location_key", stop.id));
            }
        }
        let mut distances = HashSet::new();
        for route_stop in self.route_stops.values() {
            if !self.routes.contains_key(&route_stop.route_id) {
                return Err(missing_reference(
                    "route_stops_route_id_fkey",
                    format!("route_id)=({}", route_stop.route_id),
                ));
            }
            if !self.stops.contains_key(&route_stop.stop_id) {
                return Err(missing_reference(
                    "route_stops_stop_id_fkey",
                    format!("stop_id)=({}", route_stop.stop_id),
                ));
            }
            if route_stop.distance < 0 {
                return Err(DatabaseError::Integrity(format!(
                    "new row for relation \"route_stops\" violates check constraint \
                     \"route_stops_distance_check\": distance {}",
                    route_stop.distance
                )));
            }
            if !distances.insert((route_stop.route_id, route_stop.distance)) {
                return Err(duplicate_key(
                    "route_stops_route_id_distance_key",
                    format!("{}, {}", route_stop.route_id, route_stop.distance),
                ));
            }
        }
        Ok(())
    }

    fn route_stops_where<'a>(
        &'a self,
        route_id: Option<&'a Id<Route>>,
        stop_id: Option<&'a Id<Stop>>,
    ) -> impl Iterator<Item = &'a RouteStop> + 'a {
        self.route_stops.values().filter(move |route_stop| {
            route_id.map_or(true, |route_id| route_stop.route_id == *route_id)
                && stop_id.map_or(true, |stop_id| route_stop.stop_id == *stop_id)
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemoryTransaction;

    async fn transaction(&self) -> Result<MemoryTransaction> {
        let working = self.tables.lock().await.clone();
        Ok(MemoryTransaction {
            committed: self.tables.clone(),
            working,
            changes: Vec::new(),
        })
    }
}

pub struct MemoryTransaction {
    committed: Arc<Mutex<Tables>>,
    working: Tables,
    changes: Vec<Change>,
}

impl MemoryTransaction {
    /// Applies `change` to the working copy, unless that breaks a constraint.
    fn write(&mut self, change: Change) -> Result<()> {
        let mut next = self.working.clone();
        next.apply(&change)?;
        next.validate()?;
        self.working = next;
        self.changes.push(change);
        Ok(())
    }
}

#[async_trait]
impl DatabaseTransaction for MemoryTransaction {
    async fn commit(self) -> Result<()> {
        let mut committed = self.committed.lock().await;
        let mut next = committed.clone();
        for change in &self.changes {
            next.apply(change).map_err(|why| match why {
                DatabaseError::NotFound => DatabaseError::Integrity(
                    "row was removed by a concurrent transaction".to_owned(),
                ),
                other => other,
            })?;
        }
        next.validate()?;
        *committed = next;
        debug!("committed {} changes", self.changes.len());
        Ok(())
    }
}

macro_rules! memory_repo {
    ($resource:ty, $table:ident, $put:ident, $delete:ident) => {
        #[async_trait]
        impl Repo<$resource> for MemoryTransaction {
            async fn get(&mut self, id: &Id<$resource>) -> Result<Option<$resource>> {
                Ok(self.working.$table.get(id).cloned())
            }

            async fn get_all(&mut self) -> Result<Vec<$resource>> {
                Ok(self.working.$table.values().cloned().collect())
            }

            async fn put(&mut self, element: &$resource) -> Result<$resource> {
                self.write(Change::$put(element.clone()))?;
                Ok(element.clone())
            }

            async fn delete(&mut self, id: &Id<$resource>) -> Result<()> {
                self.write(Change::$delete(id.clone()))
            }

            async fn exists(&mut self, id: &Id<$resource>) -> Result<bool> {
                Ok(self.working.$table.contains_key(id))
            }
        }
    };
}

memory_repo!(TransportType, types, PutType, DeleteType);
memory_repo!(Route, routes, PutRoute, DeleteRoute);
memory_repo!(Node, nodes, PutNode, DeleteNode);

#[async_trait]
impl TypeRepo for MemoryTransaction {
    async fn insert(&mut self, element: &TransportType) -> Result<TransportType> {
        self.write(Change::InsertType(element.clone()))?;
        Ok(element.clone())
    }

    async fn rename(
        &mut self,
        name: &Id<TransportType>,
        element: &TransportType,
    ) -> Result<TransportType> {
        self.write(Change::RenameType(name.clone(), element.clone()))?;
        Ok(element.clone())
    }
}

#[async_trait]
impl Repo<Stop> for MemoryTransaction {
    async fn get(&mut self, id: &Id<Stop>) -> Result<Option<Stop>> {
        self.working.stops.get(id).map(StopRow::to_model).transpose()
    }

    async fn get_all(&mut self) -> Result<Vec<Stop>> {
        self.working.stops.values().map(StopRow::to_model).collect()
    }

    async fn put(&mut self, element: &Stop) -> Result<Stop> {
        let row = StopRow::from_model(element)?;
        self.write(Change::PutStop(row.clone()))?;
        row.to_model()
    }

    async fn delete(&mut self, id: &Id<Stop>) -> Result<()> {
        self.write(Change::DeleteStop(*id))
    }

    async fn exists(&mut self, id: &Id<Stop>) -> Result<bool> {
        Ok(self.working.stops.contains_key(id))
    }
}

#[async_trait]
impl Repo<RouteStop> for MemoryTransaction {
    async fn get(&mut self, id: &Id<RouteStop>) -> Result<Option<RouteStop>> {
        Ok(self.working.route_stops.get(id).cloned())
    }

    async fn get_all(&mut self) -> Result<Vec<RouteStop>> {
        self.filter(None, None).await
    }

    async fn put(&mut self, element: &RouteStop) -> Result<RouteStop> {
        self.write(Change::PutRouteStop(element.clone()))?;
        Ok(element.clone())
    }

    async fn delete(&mut self, id: &Id<RouteStop>) -> Result<()> {
        self.write(Change::DeleteRouteStop(*id))
    }

    async fn exists(&mut self, id: &Id<RouteStop>) -> Result<bool> {
        Ok(self.working.route_stops.contains_key(id))
    }
}

#[async_trait]
impl RouteStopRepo for MemoryTransaction {
    async fn filter(
        &mut self,
        route_id: Option<&Id<Route>>,
        stop_id: Option<&Id<Stop>>,
    ) -> Result<Vec<RouteStop>> {
        Ok(self
            .working
            .route_stops_where(route_id, stop_id)
            .sorted_by_key(|route_stop| (route_stop.route_id.raw(), route_stop.distance))
            .cloned()
            .collect())
    }

    async fn last(&mut self, route_id: Option<&Id<Route>>) -> Result<Option<RouteStop>> {
        Ok(self
            .working
            .route_stops_where(route_id, None)
            .max_by_key(|route_stop| route_stop.distance)
            .cloned())
    }

    async fn next_after(
        &mut self,
        route_id: Option<&Id<Route>>,
        distance: i32,
    ) -> Result<Option<RouteStop>> {
        Ok(self
            .working
            .route_stops_where(route_id, None)
            .filter(|route_stop| route_stop.distance > distance)
            .min_by_key(|route_stop| route_stop.distance)
            .cloned())
    }

    async fn respace(&mut self, route_id: &Id<Route>, step: i32) -> Result<u64> {
        let count = self.working.route_stops_where(Some(route_id), None).count();
        self.write(Change::Respace(*route_id, step))?;
        Ok(count as u64)
    }
}
