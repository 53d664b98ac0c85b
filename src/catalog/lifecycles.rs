//! Status machines of the catalog collections

use crate::lifecycle::StatusMachine;

/// Ticket lifecycle. `direct_payment` keeps the CREATED -> PAID shortcut
/// used by services that skip the pending-payment step.
pub fn ticket(direct_payment: bool) -> StatusMachine {
    let machine = StatusMachine::new("status")
        .allow("CREATED", &["PENDING_PAYMENT", "PAID", "EXPIRED", "CANCELLED"])
        .allow("PENDING_PAYMENT", &["PAID", "EXPIRED", "CANCELLED"])
        .allow("PAID", &["VALIDATED", "EXPIRED", "CANCELLED"])
        .allow("VALIDATED", &["VALIDATED", "EXPIRED", "CANCELLED"])
        .terminal(&["EXPIRED", "CANCELLED"])
        .initial(&["CREATED", "PENDING_PAYMENT"]);

    if direct_payment {
        machine
    } else {
        machine.forbid("CREATED", "PAID")
    }
}

pub fn trip() -> StatusMachine {
    StatusMachine::new("status")
        .allow("SCHEDULED", &["DELAYED", "IN_PROGRESS", "CANCELLED"])
        .allow("DELAYED", &["DELAYED", "IN_PROGRESS", "CANCELLED"])
        .allow("IN_PROGRESS", &["COMPLETED"])
        .terminal(&["COMPLETED", "CANCELLED"])
        .initial(&["SCHEDULED"])
}

pub fn payment() -> StatusMachine {
    StatusMachine::new("status")
        .allow("PENDING", &["SUCCESS", "FAILED"])
        .allow("SUCCESS", &["REFUNDED"])
        .terminal(&["FAILED", "REFUNDED"])
        .initial(&["PENDING", "SUCCESS", "FAILED"])
}

pub fn service_disruption() -> StatusMachine {
    StatusMachine::new("status")
        .allow("ACTIVE", &["MONITORING", "RESOLVED"])
        .allow("MONITORING", &["ACTIVE", "RESOLVED"])
        .terminal(&["RESOLVED"])
        .initial(&["ACTIVE"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::TransitionRefusal;

    #[test]
    fn test_ticket_happy_path() {
        let machine = ticket(true);
        let path = ["CREATED", "PENDING_PAYMENT", "PAID", "VALIDATED", "EXPIRED"];
        for pair in path.windows(2) {
            assert!(machine.check(pair[0], pair[1]).is_ok(), "{:?}", pair);
        }
    }

    #[test]
    fn test_direct_payment_toggle() {
        assert!(ticket(true).check("CREATED", "PAID").is_ok());
        assert_eq!(
            ticket(false).check("CREATED", "PAID"),
            Err(TransitionRefusal::Undeclared {
                from: "CREATED".into(),
                to: "PAID".into()
            })
        );
    }

    #[test]
    fn test_ticket_cannot_go_back_to_paid() {
        assert!(ticket(true).check("VALIDATED", "PAID").is_err());
    }

    #[test]
    fn test_trip_completed_is_terminal() {
        assert!(matches!(
            trip().check("COMPLETED", "IN_PROGRESS"),
            Err(TransitionRefusal::Terminal { .. })
        ));
        assert!(trip().check("SCHEDULED", "COMPLETED").is_err());
    }

    #[test]
    fn test_new_documents_start_early_in_their_lifecycle() {
        assert!(ticket(true).is_initial("PENDING_PAYMENT"));
        assert!(!ticket(true).is_initial("VALIDATED"));
        assert!(!trip().is_initial("COMPLETED"));
        assert!(payment().is_initial("SUCCESS"));
        assert!(!payment().is_initial("REFUNDED"));
        assert!(!service_disruption().is_initial("RESOLVED"));
    }

    #[test]
    fn test_disruption_can_reopen_from_monitoring() {
        assert!(service_disruption().check("MONITORING", "ACTIVE").is_ok());
        assert!(service_disruption().check("RESOLVED", "ACTIVE").is_err());
    }
}
