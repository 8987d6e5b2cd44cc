//! Integration tests against a live PLC (or a Snap7-server mock of one).
//! Every test here needs a reachable device at the hardcoded address below,
//! so they're `#[ignore]`d by default — run with `cargo test -- --ignored`
//! once `S7_TEST_IP` points at a real target.

use s7client::{S7Client, S7Pool, S7Types};
use tokio::join;

const TEST_DB: u16 = 1;
const TEST_IP: std::net::Ipv4Addr = std::net::Ipv4Addr::new(192, 168, 10, 72);

#[tokio::test]
#[ignore]
async fn create_connections() {
    let mut client = S7Client::new(TEST_IP, S7Types::S71200)
        .await
        .expect("Could not create S7 Client");

    let data = client
        .db_read(0, 48, 4)
        .await
        .expect("Could not read from S7 PLC");
    assert_eq!(data.len(), 4);

    let data2 = client
        .db_read(0, 0, 1)
        .await
        .expect("Could not read from S7 PLC");
    assert_eq!(data2.len(), 1);

    let pool = S7Pool::new(TEST_IP, S7Types::S71200).expect("Could not create Pool");
    let one = pool.db_read(0, 0, 1);
    let two = pool.db_read(0, 0, 1);
    let three = pool.db_read(0, 0, 1);
    let four = pool.db_read(0, 0, 1);

    let (r1, r2, r3, r4) = join!(one, two, three, four);
    assert!(r1.is_ok() && r2.is_ok() && r3.is_ok() && r4.is_ok());
    assert_eq!(r1.unwrap().len(), 1);
    assert_eq!(r2.unwrap().len(), 1);
    assert_eq!(r3.unwrap().len(), 1);
    assert_eq!(r4.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_data_exchange() {
    let pool = S7Pool::new(TEST_IP, S7Types::S71200).expect("Could not create pool");

    for test_value in [32u32, 18942] {
        let test_data = test_value.to_be_bytes();
        pool.db_write(TEST_DB, 40, &test_data)
            .await
            .expect("Could not write to S7");

        let read_data = pool
            .db_read(TEST_DB, 40, test_data.len() as u32)
            .await
            .expect("Could not read data from S7");

        assert_eq!(read_data, test_data);
    }
}

#[tokio::test]
#[ignore]
async fn test_bit_exchange() {
    let test_byte = 0;
    let test_bit = 1;

    let mut client = S7Client::new(TEST_IP, S7Types::S71200)
        .await
        .expect("Could not create S7 Client");

    client
        .db_write_bit(TEST_DB, test_byte, test_bit, true)
        .await
        .expect("Could not write bit");
    assert!(client
        .db_read_bit(TEST_DB, test_byte, test_bit)
        .await
        .expect("Could not read bit"));

    client
        .db_write_bit(TEST_DB, test_byte, test_bit, false)
        .await
        .expect("Could not write bit");
    assert!(!client
        .db_read_bit(TEST_DB, test_byte, test_bit)
        .await
        .expect("Could not read bit"));
}

#[tokio::test]
#[ignore]
async fn test_read_split() {
    let pool = S7Pool::new(TEST_IP, S7Types::S71200).expect("Could not create pool");

    let read_data = pool
        .db_read(0, 40, 900)
        .await
        .expect("Could not read data from S7");

    assert_eq!(read_data.len(), 900);
}

#[tokio::test]
#[ignore]
async fn test_userdata_operations() {
    let mut client = S7Client::new(TEST_IP, S7Types::S71200)
        .await
        .expect("Could not create S7 Client");

    let counts = client.list_blocks().await.expect("Could not list blocks");
    assert!(counts.db > 0 || counts.fb > 0 || counts.fc > 0);

    let state = client.cpu_state().await.expect("Could not read CPU state");
    println!("{state:?}");
}

#[tokio::test]
#[ignore]
async fn test_dbview_row_roundtrip() {
    use s7client::dbview::{parse_layout, DbView, Value};

    let mut client = S7Client::new(TEST_IP, S7Types::S71200)
        .await
        .expect("Could not create S7 Client");

    let layout = parse_layout("0 counter DWORD\n").expect("Could not parse layout");
    let row_size = layout.row_size();
    let mut view = DbView::new(TEST_DB, vec![0u8; row_size], layout, 1, 0, 0, None);

    {
        let mut row = view.row(0).unwrap();
        row.read(&mut client).await.expect("Could not read row");
        let before = match row.get("counter").unwrap() {
            Value::DWord(v) => v,
            _ => unreachable!(),
        };
        row.set("counter", Value::DWord(before.wrapping_add(1)))
            .unwrap();
        row.write(&mut client).await.expect("Could not write row");
    }
}
