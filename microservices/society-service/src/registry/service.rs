//! Society Registry
//!
//! Societies, members and the rules binding them: one society per
//! chairman, one society at a time per member, chairman-only
//! configuration updates.

use dashmap::DashMap;
use rust_decimal::Decimal;
use samaj_core::{PhoneNumber, Result, Role, SamajError, UserType};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::types::{BankAccount, Member, Society};

#[derive(Clone)]
pub struct RegistryService {
    societies: Arc<DashMap<Uuid, Society>>,
    members: Arc<DashMap<Uuid, Member>>,
    /// Phone numbers are unique per account
    members_by_phone: Arc<DashMap<String, Uuid>>,
    /// A chairman runs at most one society
    society_by_chairman: Arc<DashMap<Uuid, Uuid>>,
}

impl RegistryService {
    pub fn new() -> Self {
        Self {
            societies: Arc::new(DashMap::new()),
            members: Arc::new(DashMap::new()),
            members_by_phone: Arc::new(DashMap::new()),
            society_by_chairman: Arc::new(DashMap::new()),
        }
    }

    /// Look up a member by phone, creating the account on first login.
    pub fn find_or_create_member(
        &self,
        phone: &PhoneNumber,
        name: &str,
        role: Role,
    ) -> Member {
        let member_id = *self
            .members_by_phone
            .entry(phone.as_str().to_string())
            .or_insert_with(|| {
                let member = Member::new(phone.clone(), name.to_string(), role);
                let id = member.id;
                info!(member_id = %id, role = %role, "Member registered");
                self.members.insert(id, member);
                id
            });

        // The phone index is authoritative, so the member row must exist.
        self.members
            .get(&member_id)
            .map(|m| m.clone())
            .unwrap_or_else(|| Member::new(phone.clone(), name.to_string(), role))
    }

    pub fn member(&self, member_id: Uuid) -> Result<Member> {
        self.members
            .get(&member_id)
            .map(|m| m.clone())
            .ok_or_else(|| SamajError::NotFound("Member not found".to_string()))
    }

    pub fn society(&self, society_id: Uuid) -> Result<Society> {
        self.societies
            .get(&society_id)
            .map(|s| s.clone())
            .ok_or_else(|| SamajError::NotFound("Society not found".to_string()))
    }

    /// Create a society. Chairman role required; one society per chairman.
    pub fn create_society(&self, chairman: &Member, name: &str, address: &str) -> Result<Society> {
        if chairman.role != Role::Chairman {
            return Err(SamajError::Forbidden(
                "Only chairmen can create societies".to_string(),
            ));
        }

        let society = Society::new(name.to_string(), address.to_string(), chairman.id);
        match self.society_by_chairman.entry(chairman.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(SamajError::Validation(
                    "You already have a society".to_string(),
                ));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(society.id);
            }
        }

        self.societies.insert(society.id, society.clone());
        if let Some(mut member) = self.members.get_mut(&chairman.id) {
            member.society_id = Some(society.id);
        }

        info!(society_id = %society.id, chairman_id = %chairman.id, "Society created");
        Ok(society)
    }

    /// Update the society's bank account. Chairman of that society only.
    pub fn update_bank_details(
        &self,
        society_id: Uuid,
        requester_id: Uuid,
        account: BankAccount,
    ) -> Result<()> {
        let mut society = self
            .societies
            .get_mut(&society_id)
            .ok_or_else(|| SamajError::NotFound("Society not found".to_string()))?;

        if society.chairman_id != requester_id {
            return Err(SamajError::Forbidden(
                "Only the chairman can update bank details".to_string(),
            ));
        }

        society.bank_account = Some(account);
        Ok(())
    }

    /// Update maintenance rates. Chairman only; rates must be non-negative.
    pub fn update_maintenance_rates(
        &self,
        society_id: Uuid,
        requester_id: Uuid,
        owner_rate: Decimal,
        tenant_rate: Decimal,
    ) -> Result<()> {
        if owner_rate < Decimal::ZERO || tenant_rate < Decimal::ZERO {
            return Err(SamajError::Validation(
                "Maintenance rates must be non-negative".to_string(),
            ));
        }

        let mut society = self
            .societies
            .get_mut(&society_id)
            .ok_or_else(|| SamajError::NotFound("Society not found".to_string()))?;

        if society.chairman_id != requester_id {
            return Err(SamajError::Forbidden(
                "Only the chairman can update maintenance rates".to_string(),
            ));
        }

        society.owner_maintenance_rate = Some(owner_rate);
        society.tenant_maintenance_rate = Some(tenant_rate);

        info!(
            society_id = %society_id,
            owner = %owner_rate,
            tenant = %tenant_rate,
            "Maintenance rates updated"
        );
        Ok(())
    }

    /// Case-insensitive name search, capped at 20 results.
    pub fn search(&self, query: &str) -> Vec<Society> {
        let needle = query.to_lowercase();
        self.societies
            .iter()
            .filter(|s| s.value().name.to_lowercase().contains(&needle))
            .map(|s| s.value().clone())
            .take(20)
            .collect()
    }

    /// Join a society as owner or tenant. Residents only.
    pub fn join_society(
        &self,
        member_id: Uuid,
        society_id: Uuid,
        user_type: UserType,
    ) -> Result<()> {
        if !self.societies.contains_key(&society_id) {
            return Err(SamajError::NotFound("Society not found".to_string()));
        }

        let mut member = self
            .members
            .get_mut(&member_id)
            .ok_or_else(|| SamajError::NotFound("Member not found".to_string()))?;

        if member.role != Role::User {
            return Err(SamajError::Forbidden(
                "Only residents can join societies".to_string(),
            ));
        }

        member.society_id = Some(society_id);
        member.user_type = Some(user_type);

        info!(member_id = %member_id, society_id = %society_id, user_type = %user_type, "Member joined society");
        Ok(())
    }

    /// Resident members of a society. Chairman of that society only.
    pub fn members_of(&self, society_id: Uuid, requester_id: Uuid) -> Result<Vec<Member>> {
        let society = self.society(society_id)?;
        if society.chairman_id != requester_id {
            return Err(SamajError::Forbidden(
                "Only the chairman can view members".to_string(),
            ));
        }

        Ok(self
            .members
            .iter()
            .filter(|m| m.value().society_id == Some(society_id) && m.value().role == Role::User)
            .map(|m| m.value().clone())
            .collect())
    }
}

impl Default for RegistryService {
    fn default() -> Self {
        Self::new()
    }
}
