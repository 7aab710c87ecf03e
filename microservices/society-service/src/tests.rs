//! Unit tests for Society Service

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use samaj_core::{PhoneNumber, Role, TokenKeys, UserType};

    use crate::{AuthService, NotificationService, RegistryService};

    fn auth(otp_ttl_minutes: i64) -> AuthService {
        AuthService::new(TokenKeys::new("test-secret", "samaj", 3600), otp_ttl_minutes)
    }

    #[test]
    fn otp_issue_and_verify() {
        let auth = auth(10);
        let phone = PhoneNumber::new("9876543210");

        let otp = auth.issue_otp(&phone);
        assert_eq!(otp.len(), 6);
        assert!(auth.check_otp(&phone, &otp).is_ok());
    }

    #[test]
    fn otp_mismatch_is_rejected() {
        let auth = auth(10);
        let phone = PhoneNumber::new("9876543210");

        let otp = auth.issue_otp(&phone);
        let wrong = if otp == "000000" { "000001" } else { "000000" };
        assert!(auth.check_otp(&phone, wrong).is_err());
    }

    #[test]
    fn otp_expires() {
        // Negative TTL makes every entry already expired.
        let auth = auth(-1);
        let phone = PhoneNumber::new("9876543210");

        let otp = auth.issue_otp(&phone);
        assert!(auth.check_otp(&phone, &otp).is_err());
    }

    #[test]
    fn otp_cannot_be_replayed_after_consume() {
        let auth = auth(10);
        let phone = PhoneNumber::new("9876543210");

        let otp = auth.issue_otp(&phone);
        assert!(auth.check_otp(&phone, &otp).is_ok());
        auth.consume_otp(&phone);
        assert!(auth.check_otp(&phone, &otp).is_err());
    }

    #[test]
    fn member_account_is_unique_per_phone() {
        let registry = RegistryService::new();
        let phone = PhoneNumber::new("9876543210");

        let first = registry.find_or_create_member(&phone, "Asha", Role::User);
        let second = registry.find_or_create_member(&phone, "Asha", Role::User);
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn only_chairmen_create_societies() {
        let registry = RegistryService::new();
        let resident =
            registry.find_or_create_member(&PhoneNumber::new("9876543210"), "Asha", Role::User);

        assert!(registry
            .create_society(&resident, "Green Acres", "Pune")
            .is_err());
    }

    #[test]
    fn chairman_gets_at_most_one_society() {
        let registry = RegistryService::new();
        let chairman = registry.find_or_create_member(
            &PhoneNumber::new("9876543210"),
            "Ravi",
            Role::Chairman,
        );

        assert!(registry
            .create_society(&chairman, "Green Acres", "Pune")
            .is_ok());
        assert!(registry
            .create_society(&chairman, "Second Society", "Pune")
            .is_err());
    }

    #[test]
    fn joining_sets_society_and_user_type() {
        let registry = RegistryService::new();
        let chairman = registry.find_or_create_member(
            &PhoneNumber::new("9000000001"),
            "Ravi",
            Role::Chairman,
        );
        let society = registry
            .create_society(&chairman, "Green Acres", "Pune")
            .unwrap();
        let resident =
            registry.find_or_create_member(&PhoneNumber::new("9000000002"), "Asha", Role::User);

        registry
            .join_society(resident.id, society.id, UserType::Tenant)
            .unwrap();

        let resident = registry.member(resident.id).unwrap();
        assert_eq!(resident.society_id, Some(society.id));
        assert_eq!(resident.user_type, Some(UserType::Tenant));
    }

    #[test]
    fn maintenance_rates_must_be_non_negative() {
        let registry = RegistryService::new();
        let chairman = registry.find_or_create_member(
            &PhoneNumber::new("9000000001"),
            "Ravi",
            Role::Chairman,
        );
        let society = registry
            .create_society(&chairman, "Green Acres", "Pune")
            .unwrap();

        assert!(registry
            .update_maintenance_rates(society.id, chairman.id, dec!(-1), dec!(2500))
            .is_err());
        assert!(registry
            .update_maintenance_rates(society.id, chairman.id, dec!(2000), dec!(2500))
            .is_ok());

        let society = registry.society(society.id).unwrap();
        assert_eq!(society.owner_maintenance_rate, Some(dec!(2000)));
        assert_eq!(society.tenant_maintenance_rate, Some(dec!(2500)));
    }

    #[test]
    fn only_the_chairman_updates_rates() {
        let registry = RegistryService::new();
        let chairman = registry.find_or_create_member(
            &PhoneNumber::new("9000000001"),
            "Ravi",
            Role::Chairman,
        );
        let society = registry
            .create_society(&chairman, "Green Acres", "Pune")
            .unwrap();
        let stranger =
            registry.find_or_create_member(&PhoneNumber::new("9000000002"), "Asha", Role::User);

        assert!(registry
            .update_maintenance_rates(society.id, stranger.id, dec!(2000), dec!(2500))
            .is_err());
    }

    #[test]
    fn member_listing_is_chairman_scoped() {
        let registry = RegistryService::new();
        let chairman = registry.find_or_create_member(
            &PhoneNumber::new("9000000001"),
            "Ravi",
            Role::Chairman,
        );
        let society = registry
            .create_society(&chairman, "Green Acres", "Pune")
            .unwrap();
        let resident =
            registry.find_or_create_member(&PhoneNumber::new("9000000002"), "Asha", Role::User);
        registry
            .join_society(resident.id, society.id, UserType::Owner)
            .unwrap();

        let members = registry.members_of(society.id, chairman.id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, resident.id);

        assert!(registry.members_of(society.id, resident.id).is_err());
    }

    #[test]
    fn society_search_is_case_insensitive() {
        let registry = RegistryService::new();
        let chairman = registry.find_or_create_member(
            &PhoneNumber::new("9000000001"),
            "Ravi",
            Role::Chairman,
        );
        registry
            .create_society(&chairman, "Green Acres", "Pune")
            .unwrap();

        assert_eq!(registry.search("green").len(), 1);
        assert_eq!(registry.search("ACRES").len(), 1);
        assert!(registry.search("palms").is_empty());
    }

    #[test]
    fn unread_count_tracks_read_marks() {
        let notifications = NotificationService::new();
        let society_id = uuid::Uuid::new_v4();
        let chairman_id = uuid::Uuid::new_v4();
        let member_id = uuid::Uuid::new_v4();

        let first = notifications.broadcast(society_id, chairman_id, "Water cut on Monday");
        notifications.broadcast(society_id, chairman_id, "Diwali meet at 6pm");

        assert_eq!(notifications.unread_count(society_id, member_id), 2);

        notifications.mark_read(member_id, &[first.id]);
        assert_eq!(notifications.unread_count(society_id, member_id), 1);

        // Marking again is a no-op, not a duplicate.
        notifications.mark_read(member_id, &[first.id]);
        assert_eq!(notifications.unread_count(society_id, member_id), 1);
    }

    #[test]
    fn feed_is_newest_first_and_per_society() {
        let notifications = NotificationService::new();
        let society_a = uuid::Uuid::new_v4();
        let society_b = uuid::Uuid::new_v4();
        let chairman_id = uuid::Uuid::new_v4();
        let member_id = uuid::Uuid::new_v4();

        notifications.broadcast(society_a, chairman_id, "first");
        notifications.broadcast(society_a, chairman_id, "second");
        notifications.broadcast(society_b, chairman_id, "other society");

        let feed = notifications.feed_for(society_a, member_id);
        assert_eq!(feed.len(), 2);
        assert!(feed[0].notification.created_at >= feed[1].notification.created_at);
        assert!(feed.iter().all(|n| n.notification.society_id == society_a));
    }
}
