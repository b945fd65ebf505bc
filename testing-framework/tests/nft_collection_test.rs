#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//! NFT collection lifecycle
//!
//! One collection goes through deploy, mint, transfer, editorship transfer
//! and content update, each stage checked against the ledger the previous
//! stage left behind.

use anyhow::Result;
use nft_testing_framework::prelude::*;

const COLLECTION_URI: &str = "https://s.getgems.io/nft-staging/c/628f6ab8077060a7a8d52d63/";

struct CollectionFixture {
    blockchain: Blockchain,
    deployer: Treasury,
    user: Treasury,
    collection: SandboxContract<NftCollection>,
}

fn init_logger() {
    let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
}

/// Ledger with a collection deployed by its first mint
async fn setup() -> Result<CollectionFixture> {
    init_logger();

    let blockchain = BlockchainBuilder::new()
        .with_config(SandboxConfig::default())
        .build()
        .await?;
    let deployer = blockchain.treasury("deployer").await?;
    let user = blockchain.treasury("user").await?;

    let royalty = RoyaltyParams::new(350, 1000, deployer.address.clone())?;
    let collection = blockchain.open_contract(NftCollection::from_init(
        deployer.address.clone(),
        Content::Offchain(COLLECTION_URI.to_string()),
        royalty,
        blockchain.config().workchain,
    )?);

    let deploy_result = collection
        .send(&deployer, to_nano("1")?, CollectionMessage::Mint)
        .await?;
    deploy_result.assert_has_transaction(
        &TransactionMatcher::new()
            .from(&deployer.address)
            .to(collection.address())
            .deploy(true)
            .success(true),
    );

    Ok(CollectionFixture {
        blockchain,
        deployer,
        user,
        collection,
    })
}

fn empty_transfer(new_owner: &Address, response_destination: &Address) -> ItemMessage {
    ItemMessage::Transfer(Transfer {
        query_id: 0,
        new_owner: new_owner.clone(),
        response_destination: response_destination.clone(),
        custom_payload: None,
        forward_amount: 0,
        forward_payload: Cell::empty(),
    })
}

async fn should_deploy_correctly(fixture: &CollectionFixture) -> Result<()> {
    let result = fixture
        .collection
        .send(&fixture.deployer, to_nano("1")?, CollectionMessage::Mint)
        .await?;

    result.assert_has_transaction(
        &TransactionMatcher::new()
            .from(&fixture.deployer.address)
            .to(fixture.collection.address())
            .success(true),
    );
    assert_eq!(fixture.collection.get_royalty_params().await?.numerator, 350);
    assert_eq!(fixture.collection.get_collection_data().await?.next_item_index, 2);
    Ok(())
}

async fn should_mint_correctly(fixture: &CollectionFixture) -> Result<SandboxContract<NftItem>> {
    let result = fixture
        .collection
        .send(&fixture.deployer, to_nano("1")?, CollectionMessage::Mint)
        .await?;

    // external, collection, item deploy, excesses
    let nft_address = result.transactions[2].address.clone();
    result.assert_has_transaction(
        &TransactionMatcher::new()
            .from(fixture.collection.address())
            .to(&nft_address)
            .deploy(true)
            .success(true),
    );
    assert_eq!(
        fixture.collection.get_nft_address_by_index(2).await?,
        nft_address
    );

    let nft = fixture.blockchain.open_contract(NftItem::from_address(nft_address));
    let data = nft.get_nft_data().await?;
    assert_eq!(data.owner.as_ref(), Some(&fixture.deployer.address));
    assert_eq!(&data.collection_address, fixture.collection.address());
    assert_eq!(data.index, 2);
    Ok(nft)
}

async fn should_transfer(fixture: &CollectionFixture, nft: &SandboxContract<NftItem>) -> Result<()> {
    let result = nft
        .send(
            &fixture.deployer,
            to_nano("0.2")?,
            empty_transfer(&fixture.user.address, &fixture.user.address),
        )
        .await?;

    result.assert_has_transaction(
        &TransactionMatcher::new()
            .from(&fixture.deployer.address)
            .to(nft.address())
            .success(true),
    );
    result.assert_has_transaction(
        &TransactionMatcher::new()
            .from(nft.address())
            .to(&fixture.user.address)
            .success(true),
    );
    assert_eq!(nft.get_nft_data().await?.owner.as_ref(), Some(&fixture.user.address));
    Ok(())
}

async fn should_transfer_editorship(fixture: &CollectionFixture, nft: &SandboxContract<NftItem>) -> Result<()> {
    nft.send(
        &fixture.deployer,
        to_nano("0.2")?,
        ItemMessage::TransferEditorship(TransferEditorship {
            query_id: 0,
            new_editor: fixture.user.address.clone(),
            response_destination: fixture.user.address.clone(),
            forward_amount: 0,
            forward_payload: Cell::empty(),
        }),
    )
    .await?;

    let data = nft.get_nft_data().await?;
    assert_eq!(data.editor.as_ref(), Some(&fixture.user.address));
    assert_eq!(data.owner.as_ref(), Some(&fixture.user.address));
    Ok(())
}

async fn should_edit_metadata(fixture: &CollectionFixture, nft: &SandboxContract<NftItem>) -> Result<()> {
    let new_content = CellBuilder::new().store_string_tail("Spite")?.build();
    let result = nft
        .send(
            &fixture.user,
            to_nano("0.2")?,
            ItemMessage::UpdateNftContent(UpdateNftContent {
                query_id: 0,
                new_content,
            }),
        )
        .await?;

    result.assert_has_transaction(
        &TransactionMatcher::new()
            .from(&fixture.user.address)
            .to(nft.address())
            .success(true),
    );

    let expected = CellBuilder::new()
        .store_string_tail("Spite")?
        .store_string_tail("2")?
        .store_string_tail(".json")?
        .build();
    assert_eq!(
        nft.get_nft_data().await?.individual_content.hash().to_hex(),
        expected.hash().to_hex()
    );
    Ok(())
}

#[tokio::test]
async fn test_collection_lifecycle() -> Result<()> {
    let fixture = setup().await?;

    let data = fixture.collection.get_collection_data().await?;
    println!("Next IndexID: {}", data.next_item_index);
    println!("Collection Address: {}", fixture.collection.address());
    assert_eq!(data.next_item_index, 1);

    should_deploy_correctly(&fixture).await?;
    let nft = should_mint_correctly(&fixture).await?;
    should_transfer(&fixture, &nft).await?;
    should_transfer_editorship(&fixture, &nft).await?;
    should_edit_metadata(&fixture, &nft).await?;

    InvariantTracker::new(None)
        .check(InvariantKind::ValueConservation, &fixture.blockchain, None)
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_transfer_bounces() -> Result<()> {
    let fixture = setup().await?;
    let nft = fixture
        .blockchain
        .open_contract(NftItem::from_init(fixture.collection.address(), 0)?);
    let balance_before = fixture.blockchain.get_balance(&fixture.user.address).await?;

    // item 0 belongs to the deployer
    let result = nft
        .send(
            &fixture.user,
            to_nano("0.5")?,
            empty_transfer(&fixture.user.address, &fixture.user.address),
        )
        .await?;

    result.assert_has_transaction(
        &TransactionMatcher::new()
            .from(&fixture.user.address)
            .to(nft.address())
            .success(false)
            .exit_code(2002),
    );
    result.assert_has_transaction(
        &TransactionMatcher::new()
            .from(nft.address())
            .to(&fixture.user.address)
            .bounced(true),
    );
    assert_eq!(nft.get_nft_data().await?.owner.as_ref(), Some(&fixture.deployer.address));

    let fees = fixture.blockchain.config().fees.clone();
    let balance_after = fixture.blockchain.get_balance(&fixture.user.address).await?;
    // external, failed item, bounced return
    assert_eq!(
        balance_before - balance_after,
        3 * fees.compute_fee + 2 * fees.forward_fee
    );
    Ok(())
}

#[tokio::test]
async fn test_editor_cannot_be_stolen() -> Result<()> {
    let fixture = setup().await?;
    let nft = fixture
        .blockchain
        .open_contract(NftItem::from_init(fixture.collection.address(), 0)?);

    let result = nft
        .send(
            &fixture.user,
            to_nano("0.2")?,
            ItemMessage::UpdateNftContent(UpdateNftContent {
                query_id: 0,
                new_content: CellBuilder::new().store_string_tail("Stolen")?.build(),
            }),
        )
        .await?;

    result.assert_has_transaction(&TransactionMatcher::new().to(nft.address()).success(false));
    // off-chain prefix, collection URI, index, suffix
    let content = nft.get_nft_data().await?.individual_content;
    let mut expected = vec![0x01];
    expected.extend_from_slice(format!("{}0.json", COLLECTION_URI).as_bytes());
    assert_eq!(
        content.hash(),
        CellBuilder::new().store_bytes_tail(&expected)?.build().hash()
    );
    Ok(())
}

#[tokio::test]
async fn test_addresses_are_deterministic() -> Result<()> {
    let first = setup().await?;
    let second = setup().await?;

    assert_eq!(first.deployer.address, second.deployer.address);
    assert_eq!(first.collection.address(), second.collection.address());
    assert_eq!(
        first.collection.get_nft_address_by_index(7).await?,
        second.collection.get_nft_address_by_index(7).await?
    );
    Ok(())
}

#[tokio::test]
async fn test_mint_with_too_little_value_fails() -> Result<()> {
    let fixture = setup().await?;

    let result = fixture
        .collection
        .send(&fixture.user, to_nano("0.01")?, CollectionMessage::Mint)
        .await?;

    result.assert_has_transaction(
        &TransactionMatcher::new()
            .to(fixture.collection.address())
            .success(false),
    );
    result.assert_not_has_transaction(&TransactionMatcher::new().from(fixture.collection.address()).deploy(true));
    assert_eq!(fixture.collection.get_collection_data().await?.next_item_index, 1);
    Ok(())
}

#[tokio::test]
async fn test_time_follows_paused_clock() -> Result<()> {
    let env = DeterministicTestEnv::new_time_paused();
    let blockchain = env.blockchain_with_config(SandboxConfig::default()).build().await?;
    let deployer = blockchain.treasury("deployer").await?;
    let royalty = RoyaltyParams::new(1, 10, deployer.address.clone())?;
    let collection = blockchain.open_contract(NftCollection::from_init(
        deployer.address.clone(),
        Content::Offchain(COLLECTION_URI.to_string()),
        royalty,
        0,
    )?);

    let first = collection.send(&deployer, to_nano("1")?, CollectionMessage::Mint).await?;
    env.advance_time(tokio::time::Duration::from_secs(3600)).await;
    let second = collection.send(&deployer, to_nano("1")?, CollectionMessage::Mint).await?;

    assert_eq!(second.transactions[0].now - first.transactions[0].now, 3600);
    Ok(())
}
