//! # Custody Ledger Service - API Implementation
//!
//! Every mutating operation follows the same shape: validate arguments, take
//! the operation lock, load and check every referenced record, build the
//! write plan, commit. Nothing is written until the last check has passed.

use tracing::{debug, info, warn};

use super::helpers::{check_query_component, check_quantity, overflow};
use super::*;
use crate::domain::entities::{AgentKind, AgentRecord, EntityKind, MaterialLot, Quantity};
use crate::domain::errors::LedgerError;
use crate::domain::events::{CollectionEvent, HistoryTopic, ProcessingEvent, TransferEvent};
use crate::ports::inbound::CustodyLedgerApi;

impl<KV, TS> CustodyLedgerApi for CustodyLedgerService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    fn register_agent(&self, kind: AgentKind, id: &str, name: &str) -> Result<(), LedgerError> {
        self.config.check_identifier("agent id", id)?;
        self.config.check_field("agent name", name)?;

        let _guard = self.op_lock.lock();

        if self.entities.exists(kind.into(), id)? {
            return Err(LedgerError::AlreadyExists {
                kind: kind.into(),
                id: id.to_string(),
            });
        }

        let agent = AgentRecord::new(id, name);
        let plan = vec![self.entities.plan_save_agent(kind, &agent)?];
        self.commit("register_agent", plan)?;

        info!(%kind, agent_id = id, "[cc-01] Registered {} {}", kind, id);
        Ok(())
    }

    fn query_agent(&self, kind: AgentKind, id: &str) -> Result<AgentRecord, LedgerError> {
        self.config.check_identifier("agent id", id)?;
        let agent = self.entities.load_agent(kind, id)?;
        debug!(%kind, agent_id = id, lots = agent.holdings.len(), "[cc-01] Queried agent");
        Ok(agent)
    }

    fn delete_agent(&self, kind: AgentKind, id: &str) -> Result<(), LedgerError> {
        self.config.check_identifier("agent id", id)?;

        let _guard = self.op_lock.lock();

        let agent = self.entities.load_agent(kind, id)?;
        let mut plan = Vec::new();

        match kind {
            AgentKind::Processor => {
                if !agent.holdings.is_empty() {
                    return Err(LedgerError::HasRemainingHoldings {
                        processor_id: id.to_string(),
                        lots: agent.holdings.len(),
                    });
                }
            }
            AgentKind::Collector => {
                // The collector's share is written off from each lot total.
                for (lot_id, &held) in &agent.holdings {
                    let mut lot = self.entities.load_lot(lot_id)?;
                    lot.total_quantity = lot.total_quantity.checked_sub(held).ok_or_else(|| {
                        LedgerError::InsufficientQuantity {
                            holder: format!("lot {}", lot_id),
                            lot_id: lot_id.clone(),
                            available: lot.total_quantity,
                            requested: held,
                        }
                    })?;

                    if lot.is_depleted() {
                        plan.push(self.entities.plan_remove(EntityKind::Lot, lot_id));
                    } else {
                        plan.push(self.entities.plan_save_lot(&lot)?);
                    }
                }
            }
        }

        plan.push(self.entities.plan_remove(kind.into(), id));
        self.commit("delete_agent", plan)?;

        if kind == AgentKind::Collector && !agent.holdings.is_empty() {
            let written_off: Quantity = agent.holdings.values().sum();
            warn!(
                agent_id = id,
                lots = agent.holdings.len(),
                written_off,
                "[cc-01] Deleted collector {}, holdings removed from lot totals",
                id
            );
        } else {
            info!(%kind, agent_id = id, "[cc-01] Deleted {} {}", kind, id);
        }
        Ok(())
    }

    fn collect(
        &self,
        lot_id: &str,
        name: &str,
        category: &str,
        quantity: Quantity,
        agent_id: &str,
    ) -> Result<CollectionEvent, LedgerError> {
        self.config.check_identifier("lot id", lot_id)?;
        self.config.check_field("lot name", name)?;
        self.config.check_field("category", category)?;
        check_quantity(quantity)?;
        self.config.check_identifier("agent id", agent_id)?;

        let mut clock = self.op_lock.lock();

        let mut collector = self.entities.load_agent(AgentKind::Collector, agent_id)?;

        // Name and category of an existing lot are kept as first collected.
        let lot = match self
            .entities
            .load_optional::<MaterialLot>(EntityKind::Lot, lot_id)?
        {
            Some(mut lot) => {
                lot.total_quantity = lot
                    .total_quantity
                    .checked_add(quantity)
                    .ok_or_else(|| overflow("total", lot_id))?;
                lot
            }
            None => MaterialLot::new(lot_id, name, category, quantity),
        };

        collector
            .credit(lot_id, quantity)
            .ok_or_else(|| overflow("holding", lot_id))?;

        let event = CollectionEvent {
            agent_id: agent_id.to_string(),
            lot_id: lot_id.to_string(),
            quantity,
            timestamp: self.next_timestamp(&mut clock),
        };

        let plan = vec![
            self.entities.plan_save_lot(&lot)?,
            self.entities.plan_save_agent(AgentKind::Collector, &collector)?,
            self.history.plan_event(&event)?,
        ];
        self.commit("collect", plan)?;

        info!(
            lot_id,
            agent_id,
            quantity,
            lot_total = lot.total_quantity,
            "[cc-01] Collected {} of {} by {}",
            quantity,
            lot_id,
            agent_id
        );
        Ok(event)
    }

    fn transfer(
        &self,
        from_agent_id: &str,
        to_agent_id: &str,
        lot_id: &str,
        quantity: Quantity,
    ) -> Result<TransferEvent, LedgerError> {
        self.config.check_identifier("from agent id", from_agent_id)?;
        self.config.check_identifier("to agent id", to_agent_id)?;
        self.config.check_identifier("lot id", lot_id)?;
        check_quantity(quantity)?;

        let mut clock = self.op_lock.lock();

        let mut sender = self.entities.load_agent(AgentKind::Collector, from_agent_id)?;
        let mut receiver = self.entities.load_agent(AgentKind::Processor, to_agent_id)?;
        if !self.entities.exists(EntityKind::Lot, lot_id)? {
            return Err(LedgerError::not_found(EntityKind::Lot, lot_id));
        }

        if !sender.holds(lot_id) {
            return Err(LedgerError::NoSuchHolding {
                agent_id: from_agent_id.to_string(),
                lot_id: lot_id.to_string(),
            });
        }
        let available = sender.holding(lot_id);
        sender
            .debit(lot_id, quantity)
            .ok_or_else(|| LedgerError::InsufficientQuantity {
                holder: from_agent_id.to_string(),
                lot_id: lot_id.to_string(),
                available,
                requested: quantity,
            })?;
        receiver
            .credit(lot_id, quantity)
            .ok_or_else(|| overflow("holding", lot_id))?;

        let event = TransferEvent {
            lot_id: lot_id.to_string(),
            from_agent_id: from_agent_id.to_string(),
            to_agent_id: to_agent_id.to_string(),
            quantity,
            timestamp: self.next_timestamp(&mut clock),
        };

        let plan = vec![
            self.entities.plan_save_agent(AgentKind::Collector, &sender)?,
            self.entities.plan_save_agent(AgentKind::Processor, &receiver)?,
            self.history.plan_event(&event)?,
        ];
        self.commit("transfer", plan)?;

        info!(
            lot_id,
            from_agent_id,
            to_agent_id,
            quantity,
            "[cc-01] Transferred {} of {} from {} to {}",
            quantity,
            lot_id,
            from_agent_id,
            to_agent_id
        );
        Ok(event)
    }

    fn process(
        &self,
        processor_id: &str,
        lot_id: &str,
        method: &str,
        quantity: Quantity,
    ) -> Result<ProcessingEvent, LedgerError> {
        self.config.check_identifier("processor id", processor_id)?;
        self.config.check_identifier("lot id", lot_id)?;
        self.config.check_field("method", method)?;
        check_quantity(quantity)?;

        let mut clock = self.op_lock.lock();

        let mut processor = self.entities.load_agent(AgentKind::Processor, processor_id)?;
        let mut lot = self.entities.load_lot(lot_id)?;

        if !processor.holds(lot_id) {
            return Err(LedgerError::NoSuchHolding {
                agent_id: processor_id.to_string(),
                lot_id: lot_id.to_string(),
            });
        }
        let available = processor.holding(lot_id);
        processor
            .debit(lot_id, quantity)
            .ok_or_else(|| LedgerError::InsufficientQuantity {
                holder: processor_id.to_string(),
                lot_id: lot_id.to_string(),
                available,
                requested: quantity,
            })?;
        lot.total_quantity = lot.total_quantity.checked_sub(quantity).ok_or_else(|| {
            LedgerError::InsufficientQuantity {
                holder: format!("lot {}", lot_id),
                lot_id: lot_id.to_string(),
                available: lot.total_quantity,
                requested: quantity,
            }
        })?;

        let event = ProcessingEvent {
            processor_id: processor_id.to_string(),
            lot_id: lot_id.to_string(),
            method: method.to_string(),
            quantity,
            timestamp: self.next_timestamp(&mut clock),
        };

        // A depleted lot keeps its record.
        let plan = vec![
            self.entities.plan_save_agent(AgentKind::Processor, &processor)?,
            self.entities.plan_save_lot(&lot)?,
            self.history.plan_event(&event)?,
        ];
        self.commit("process", plan)?;

        info!(
            processor_id,
            lot_id,
            method,
            quantity,
            lot_total = lot.total_quantity,
            "[cc-01] Processed {} of {} at {} ({})",
            quantity,
            lot_id,
            processor_id,
            method
        );
        Ok(event)
    }

    fn query_lot(&self, lot_id: &str) -> Result<MaterialLot, LedgerError> {
        self.config.check_identifier("lot id", lot_id)?;
        let lot = self.entities.load_lot(lot_id)?;
        debug!(lot_id, total = lot.total_quantity, "[cc-01] Queried lot");
        Ok(lot)
    }

    fn query_collection_history(
        &self,
        agent_id: &str,
        lot_id: Option<&str>,
    ) -> Result<Vec<CollectionEvent>, LedgerError> {
        check_query_component("agent id", agent_id)?;
        if let Some(lot_id) = lot_id {
            check_query_component("lot id", lot_id)?;
        }

        if !self.entities.exists(EntityKind::Collector, agent_id)? {
            return Err(LedgerError::not_found(EntityKind::Collector, agent_id));
        }

        let mut prefix = vec![agent_id];
        prefix.extend(lot_id);
        let events: Vec<CollectionEvent> =
            self.history.query_by_prefix(HistoryTopic::Collection, &prefix)?;

        debug!(agent_id, ?lot_id, count = events.len(), "[cc-01] Collection history");
        Ok(events)
    }

    fn query_transfer_history(
        &self,
        lot_id: &str,
        from_agent_id: Option<&str>,
        to_agent_id: Option<&str>,
    ) -> Result<Vec<TransferEvent>, LedgerError> {
        check_query_component("lot id", lot_id)?;
        if to_agent_id.is_some() && from_agent_id.is_none() {
            return Err(LedgerError::invalid_query(
                "to agent id requires from agent id",
            ));
        }
        if let Some(from) = from_agent_id {
            check_query_component("from agent id", from)?;
        }
        if let Some(to) = to_agent_id {
            check_query_component("to agent id", to)?;
        }

        if !self.entities.exists(EntityKind::Lot, lot_id)? {
            return Err(LedgerError::not_found(EntityKind::Lot, lot_id));
        }

        let mut prefix = vec![lot_id];
        prefix.extend(from_agent_id);
        prefix.extend(to_agent_id);
        let events: Vec<TransferEvent> =
            self.history.query_by_prefix(HistoryTopic::Transfer, &prefix)?;

        debug!(lot_id, count = events.len(), "[cc-01] Transfer history");
        Ok(events)
    }

    fn query_processing_history(
        &self,
        processor_id: &str,
        lot_id: Option<&str>,
    ) -> Result<Vec<ProcessingEvent>, LedgerError> {
        check_query_component("processor id", processor_id)?;
        if let Some(lot_id) = lot_id {
            check_query_component("lot id", lot_id)?;
        }

        if !self.entities.exists(EntityKind::Processor, processor_id)? {
            return Err(LedgerError::not_found(EntityKind::Processor, processor_id));
        }

        let mut prefix = vec![processor_id];
        prefix.extend(lot_id);
        let events: Vec<ProcessingEvent> =
            self.history.query_by_prefix(HistoryTopic::Processing, &prefix)?;

        debug!(processor_id, ?lot_id, count = events.len(), "[cc-01] Processing history");
        Ok(events)
    }
}
