use std::io::Write;

use assert_cmd::Command;
use predicates as pred;
use tempfile::NamedTempFile;

#[test]
fn end_to_end_outputs_expected_balances() {
    // Replay a full scenario:
    // kid1 (ledger account): deposit 100.00, withdrawal request 15.00
    //   approved at 12.00 (second approval and a denied request change
    //   nothing) -> balance 88.00
    // kid2 (goal account, primary 50.00): transfer 20.00 -> 30.00/40.00;
    //   a second transfer of 40.00 overdraws and is rejected
    // unauthorized rows (no goal account, requester posting) are reported
    //   to the DLQ and leave state untouched
    let mut file = NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        "op,token,user,kind,amount,request,target,link,notes,memo\n\
        user,pt,parent,admin,,,,,,\n\
        user,kt,kid1,requester,,,,,,\n\
        user,k2,kid2,requester,,,,,,\n\
        account,,kid2,,50.00,,200.00,,,\n\
        post,pt,kid1,deposit,100.00,,,,,weekly allowance\n\
        request,kt,,withdrawal,15.00,,,https://shop.example/book,paperback is fine,new book\n\
        pending,pt,,all,,,,,,\n\
        approve,pt,,,12.00,2,,rcpt-771,,partial grant\n\
        approve,pt,,,12.00,2,,,,second try\n\
        request,kt,,withdrawal,5.00,,,,,candy\n\
        deny,pt,,,,4,,,,too much sugar\n\
        goal,k2,,transfer,20.00,,,,,\n\
        goal,k2,,transfer,40.00,,,,,\n\
        goal,kt,,deposit,1.00,,,,,\n\
        post,kt,kid1,deposit,1.00,,,,,self service\n\
        post,xx,kid1,deposit,1.00,,,,,no session\n\
        snapshot,k2,,,,,,,,\n\
        snapshot,kt,,,,,,,,\n\
        balances,pt,,,,,,,,"
    )
    .unwrap();

    let exe = env!("CARGO_BIN_EXE_allowance_ledger");
    let mut cmd = Command::new(exe);
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(pred::str::contains("user,balance"))
        .stdout(pred::str::contains("kid1,88.00"))
        .stdout(pred::str::contains("user,primary,goal,target"))
        .stdout(pred::str::contains("kid2,30.00,40.00,200.00"))
        .stdout(pred::str::contains("pending,2,kid1,Withdrawal,15.00,new book"))
        .stdout(pred::str::contains("snapshot,kid2,30.00,40.00,200.00"))
        .stdout(pred::str::contains("snapshot,kid1,88.00"))
        .stdout(pred::str::contains("txn,3,3,Withdrawal,-12.00,rcpt-771"))
        .stdout(pred::str::contains("balance,kid1,88.00"))
        .stderr(pred::str::contains("Insufficient funds"))
        .stderr(pred::str::contains("Invalid transition"))
        .stderr(pred::str::contains("Not authorized"));
}

#[test]
fn auto_post_policy_fulfills_requester_deposits() {
    let mut file = NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        "op,token,user,kind,amount,request,target,link,notes,memo\n\
        user,pt,parent,admin,,,,,,\n\
        user,kt,kid1,requester,,,,,,\n\
        request,kt,,deposit,10.00,,,,,tooth fairy"
    )
    .unwrap();

    let exe = env!("CARGO_BIN_EXE_allowance_ledger");
    let mut cmd = Command::new(exe);
    cmd.arg(file.path()).arg("--auto-post");

    cmd.assert()
        .success()
        .stdout(pred::str::contains("kid1,10.00"));
}
