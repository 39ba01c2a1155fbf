//! Unit tests for identifiers and value objects
//!
//! Tests cover the UUID-backed ids, external string ids, saksnummer,
//! fødselsnummer parsing and the caseworker role wrappers.

use core_kernel::{
    Attestant, BehandlingId, CoreError, Fnr, JournalpostId, NavIdent, OppgaveId,
    Saksbehandler, Saksnummer, SakId, SoknadId,
};
use uuid::Uuid;

mod uuid_ids {
    use super::*;

    #[test]
    fn test_display_carries_prefix() {
        assert!(SakId::new().to_string().starts_with("SAK-"));
        assert!(SoknadId::new().to_string().starts_with("SOK-"));
        assert!(BehandlingId::new().to_string().starts_with("BEH-"));
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let uuid = Uuid::new_v4();
        let with_prefix: BehandlingId = format!("BEH-{}", uuid).parse().unwrap();
        let without_prefix: BehandlingId = uuid.to_string().parse().unwrap();
        assert_eq!(with_prefix, without_prefix);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("BEH-not-a-uuid".parse::<BehandlingId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = SakId::from_uuid(uuid);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{}\"", uuid));
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let first = BehandlingId::new_v7();
        let second = BehandlingId::new_v7();
        assert!(first <= second);
    }
}

mod external_ids {
    use super::*;

    #[test]
    fn test_external_ids_are_transparent_strings() {
        let oppgave = OppgaveId::from("oppgave-42");
        assert_eq!(oppgave.as_str(), "oppgave-42");
        assert_eq!(serde_json::to_string(&oppgave).unwrap(), "\"oppgave-42\"");

        let journalpost = JournalpostId::new(String::from("jp-1"));
        assert_eq!(journalpost.to_string(), "jp-1");
    }
}

mod saksnummer {
    use super::*;

    #[test]
    fn test_saksnummer_starts_at_2021() {
        assert_eq!(Saksnummer::new(2021).unwrap().value(), 2021);
        assert_eq!(Saksnummer::new(2020).unwrap_err().ident(), Some("saksnummer"));
    }
}

mod fnr {
    use super::*;

    #[test]
    fn test_valid_fnr() {
        let fnr: Fnr = "12345678901".parse().unwrap();
        assert_eq!(fnr.as_str(), "12345678901");
    }

    #[test]
    fn test_rejects_wrong_length_and_non_digits() {
        assert!("123".parse::<Fnr>().is_err());
        assert!("123456789012".parse::<Fnr>().is_err());
        assert!("1234567890x".parse::<Fnr>().is_err());
        assert!(" 2345678901".parse::<Fnr>().is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Fnr>("\"12345678901\"").is_ok());
        assert!(serde_json::from_str::<Fnr>("\"1234\"").is_err());
    }
}

mod caseworkers {
    use super::*;

    #[test]
    fn test_nav_ident_rejects_blank() {
        assert!(NavIdent::new("   ").is_err());
        assert!(matches!(
            NavIdent::new(""),
            Err(CoreError::UgyldigIdent { ident: "nav_ident", .. })
        ));
        assert!(serde_json::from_str::<NavIdent>("\"\"").is_err());
    }

    #[test]
    fn test_same_person_compares_nav_ident() {
        let saksbehandler = Saksbehandler(NavIdent::new("Z123456").unwrap());
        let same = Attestant(NavIdent::new("Z123456").unwrap());
        let other = Attestant(NavIdent::new("Z654321").unwrap());

        assert!(same.er_samme_person_som(&saksbehandler));
        assert!(!other.er_samme_person_som(&saksbehandler));
    }

    #[test]
    fn test_role_wrappers_display_ident() {
        let attestant = Attestant(NavIdent::new("A111111").unwrap());
        assert_eq!(attestant.to_string(), "A111111");
        assert_eq!(attestant.nav_ident().as_str(), "A111111");
    }
}
